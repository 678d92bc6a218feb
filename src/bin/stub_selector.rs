use anyhow::{Context, Result, anyhow, bail};
use std::{
    env, fs,
    io::{self, Read, Write},
    process,
};

// Scriptable stand-in for dmenu/fzf, used by the integration tests.
//
// usage: stub_selector [--read0] [--record PATH] MODE [ARG]
//   first        print the first candidate
//   nth N        print candidate N (0-based)
//   echo TEXT    print TEXT regardless of the input
//   empty        print nothing, exit 0
//   exit CODE    print nothing, exit CODE
fn main() -> Result<()> {
    let mut args = env::args().skip(1).peekable();
    let mut sep = b'\n';
    let mut record = None;
    loop {
        match args.peek().map(String::as_str) {
            Some("--read0") => sep = b'\0',
            Some("--record") => {
                args.next();
                record = Some(args.peek().cloned().context("--record needs a path")?);
            }
            _ => break,
        }
        args.next();
    }
    let mode = args.next().ok_or_else(|| anyhow!("missing mode"))?;
    let arg = args.next();

    let mut input = Vec::new();
    io::stdin().read_to_end(&mut input).context("read stdin")?;
    if let Some(path) = record {
        fs::write(&path, &input).with_context(|| format!("record input to {}", path))?;
    }
    let candidates: Vec<&[u8]> = input.split(|b| *b == sep).collect();

    let mut stdout = io::stdout().lock();
    match mode.as_str() {
        "first" => {
            stdout.write_all(candidates[0])?;
            stdout.write_all(b"\n")?;
        }
        "nth" => {
            let n: usize = arg.context("nth needs an index")?.parse()?;
            let line = candidates
                .get(n)
                .ok_or_else(|| anyhow!("no candidate {}", n))?;
            stdout.write_all(line)?;
            stdout.write_all(b"\n")?;
        }
        "echo" => {
            let text = arg.context("echo needs text")?;
            writeln!(stdout, "{}", text)?;
        }
        "empty" => {}
        "exit" => {
            let code: i32 = arg.context("exit needs a code")?.parse()?;
            process::exit(code);
        }
        _ => bail!("unknown mode {}", mode),
    }
    stdout.flush()?;
    Ok(())
}
