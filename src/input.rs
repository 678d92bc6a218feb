use crate::error::{IoResultExt, Result};
use std::io::Read;

/// Read everything the clipboard watcher sends us.
/// Line endings are kept as they are, unless `unix` is set, in which case CRLF
/// becomes LF and a carriage return ending the input is dropped.
pub fn read_text<R: Read>(mut reader: R, unix: bool) -> Result<String> {
    let mut bytes = Vec::new();
    reader
        .read_to_end(&mut bytes)
        .io_context(|| "Couldn't get input from stdin.")?;
    let text = String::from_utf8_lossy(&bytes);
    if !unix {
        return Ok(text.into_owned());
    }

    let mut text = text.replace("\r\n", "\n");
    if text.ends_with('\r') {
        text.pop();
    }
    Ok(text)
}
