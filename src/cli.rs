use crate::normalize::normalize;
use crate::{FragmentOutcome, Options, ResultBuilder};
use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter, Read, Write};

fn print_help(program: &str) {
    eprintln!(
        "Usage: {prog} [OPTIONS] [INPUT]\n\
         \n\
         Replay a recorded producer transcript through the incremental builder.\n\
         INPUT: optional transcript file. When omitted, reads from stdin.\n\
         \n\
         Options:\n\
           -o, --output FILE         Write output to FILE (default stdout)\n\
               --chunk-size CHARS    Fragment size in chars (default 16)\n\
               --partials            Print each rebuilt partial view as a JSON line\n\
               --pretty              Pretty-print the final result\n\
               --no-fence            Disable fenced code block stripping\n\
               --log                 Print repair log entries to stderr\n\
           -h, --help                Show this help\n",
        prog = program
    );
}

fn parse_args() -> (Options, CliMode) {
    let mut args: Vec<String> = env::args().collect();
    let program = args
        .first()
        .cloned()
        .unwrap_or_else(|| "evalstream".to_string());
    args.remove(0);

    let mut opts = Options::default();
    let mut input: Option<String> = None;
    let mut output: Option<String> = None;
    let mut chunk_size: usize = 16;
    let mut partials = false;
    let mut pretty = false;

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => {
                print_help(&program);
                std::process::exit(0);
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Missing FILE for --output");
                    std::process::exit(2);
                }
                output = Some(args[i].clone());
            }
            "--chunk-size" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("Missing CHARS for --chunk-size");
                    std::process::exit(2);
                }
                chunk_size = match args[i].parse() {
                    Ok(n) if n > 0 => n,
                    _ => {
                        eprintln!("Invalid chunk size: {}", args[i]);
                        std::process::exit(2);
                    }
                };
            }
            "--partials" => {
                partials = true;
            }
            "--pretty" => {
                pretty = true;
            }
            "--no-fence" => {
                opts.fenced_code_blocks = false;
            }
            "--log" => {
                opts.logging = true;
            }
            s if s.starts_with('-') => {
                eprintln!("Unknown option: {}", s);
                std::process::exit(2);
            }
            path => {
                input = Some(path.to_string());
            }
        }
        i += 1;
    }

    let mode = CliMode {
        input,
        output,
        chunk_size,
        partials,
        pretty,
    };
    (opts, mode)
}

struct CliMode {
    input: Option<String>,
    output: Option<String>,
    chunk_size: usize,
    partials: bool,
    pretty: bool,
}

/// Split `s` into pieces of at most `size` chars.
fn chunk_chars(s: &str, size: usize) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut count = 0;
    for (idx, _) in s.char_indices() {
        if count == size {
            out.push(&s[start..idx]);
            start = idx;
            count = 0;
        }
        count += 1;
    }
    if start < s.len() {
        out.push(&s[start..]);
    }
    out
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (opts, mode) = parse_args();

    let content = match &mode.input {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut s = String::new();
            io::stdin().read_to_string(&mut s)?;
            s
        }
    };

    let mut out_writer: Box<dyn Write> = if let Some(ref o) = mode.output {
        Box::new(BufWriter::new(File::create(o)?))
    } else {
        Box::new(BufWriter::new(io::stdout()))
    };

    let mut builder = ResultBuilder::new(opts);
    for (n, chunk) in chunk_chars(&content, mode.chunk_size).into_iter().enumerate() {
        let outcome = builder.push(chunk);
        for entry in builder.take_repair_log() {
            eprintln!(
                "fragment {}: {} at {} near {:?}",
                n + 1,
                entry.message,
                entry.position,
                entry.context
            );
        }
        if !mode.partials {
            continue;
        }
        if let FragmentOutcome::Complete(v) | FragmentOutcome::Partial(v) = &outcome {
            let line = serde_json::json!({
                "fragment": n + 1,
                "kind": outcome.kind(),
                "view": normalize(Some(v)),
            });
            writeln!(out_writer, "{}", serde_json::to_string(&line)?)?;
        }
    }

    let (result, _) = builder.finish()?;
    let rendered = if mode.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    writeln!(out_writer, "{}", rendered)?;
    out_writer.flush()?;
    Ok(())
}
