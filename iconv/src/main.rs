//! iconv-compatible converter between UTF-8 and UTF-16.
//!
//! Usage:
//!   iconv -f <from-encoding> -t <to-encoding> [-c | --replace] [-o <file>] [file...]
//!   iconv -l

mod convert;

use std::env;
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::process::ExitCode;

use log::{debug, info, trace};
use utf8conv::CodingErrorAction;

use convert::{Charset, Converter};

const CHUNK_SIZE: usize = 8 * 1024;

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage(&args[0]);
        return ExitCode::from(1);
    }

    let mut from_encoding: Option<String> = None;
    let mut to_encoding: Option<String> = None;
    let mut output_file: Option<String> = None;
    let mut input_files: Vec<String> = Vec::new();
    let mut action = CodingErrorAction::Report;
    let mut list_encodings = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-f" | "--from-code" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("iconv: -f requires an encoding name");
                    return ExitCode::from(1);
                }
                from_encoding = Some(args[i].clone());
            }
            "-t" | "--to-code" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("iconv: -t requires an encoding name");
                    return ExitCode::from(1);
                }
                to_encoding = Some(args[i].clone());
            }
            "-o" | "--output" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("iconv: -o requires a filename");
                    return ExitCode::from(1);
                }
                output_file = Some(args[i].clone());
            }
            "-c" => action = CodingErrorAction::Ignore,
            "--replace" => action = CodingErrorAction::Replace,
            "-l" | "--list" => {
                list_encodings = true;
            }
            "-h" | "--help" => {
                print_usage(&args[0]);
                return ExitCode::SUCCESS;
            }
            "-" => input_files.push(args[i].clone()),
            arg if arg.starts_with('-') => {
                eprintln!("iconv: unknown option: {}", arg);
                return ExitCode::from(1);
            }
            _ => {
                input_files.push(args[i].clone());
            }
        }
        i += 1;
    }

    if list_encodings {
        for charset in Charset::ALL {
            println!("{}", charset.name());
        }
        return ExitCode::SUCCESS;
    }

    let Some(from) = lookup(from_encoding.as_deref(), "source", "-f") else {
        return ExitCode::from(1);
    };
    let Some(to) = lookup(to_encoding.as_deref(), "target", "-t") else {
        return ExitCode::from(1);
    };
    info!("converting {} to {} ({:?})", from.name(), to.name(), action);

    let mut output: Box<dyn Write> = match &output_file {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(e) => {
                eprintln!("iconv: cannot create {}: {}", path, e);
                return ExitCode::from(1);
            }
        },
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    if input_files.is_empty() {
        input_files.push("-".to_string());
    }

    let mut converter = Converter::new(from, to, action);
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut converted = Vec::with_capacity(CHUNK_SIZE * 2);

    for path in &input_files {
        let mut input: Box<dyn Read> = if path == "-" {
            Box::new(io::stdin().lock())
        } else {
            match File::open(path) {
                Ok(file) => Box::new(file),
                Err(e) => {
                    eprintln!("iconv: cannot open {}: {}", path, e);
                    return ExitCode::from(1);
                }
            }
        };
        debug!("reading {}", path);

        loop {
            let n = match input.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    eprintln!("iconv: cannot read {}: {}", path, e);
                    return ExitCode::from(1);
                }
            };
            trace!("read {} bytes from {}", n, path);

            let result = converter.feed(&chunk[..n], &mut converted);
            if let Err(code) = flush(&mut output, &mut converted, result) {
                return code;
            }
        }
    }

    let result = converter.finish(&mut converted);
    if let Err(code) = flush(&mut output, &mut converted, result) {
        return code;
    }
    if let Err(e) = output.flush() {
        eprintln!("iconv: cannot write output: {}", e);
        return ExitCode::from(1);
    }

    ExitCode::SUCCESS
}

fn lookup(name: Option<&str>, role: &str, flag: &str) -> Option<Charset> {
    let Some(name) = name else {
        eprintln!("iconv: {} encoding ({}) is required", role, flag);
        return None;
    };
    let charset = Charset::from_name(name);
    if charset.is_none() {
        eprintln!("iconv: conversion {} `{}' is not supported", role, name);
    }
    charset
}

/// Writes out what was converted, then reports the conversion error if any.
fn flush(
    output: &mut dyn Write,
    converted: &mut Vec<u8>,
    result: Result<(), convert::ConvertError>,
) -> Result<(), ExitCode> {
    if let Err(e) = output.write_all(converted) {
        eprintln!("iconv: cannot write output: {}", e);
        return Err(ExitCode::from(1));
    }
    converted.clear();

    if let Err(e) = result {
        let _ = output.flush();
        eprintln!("iconv: {}", e);
        return Err(ExitCode::from(1));
    }
    Ok(())
}

fn print_usage(program: &str) {
    eprintln!(
        "Usage: {} -f <from-encoding> -t <to-encoding> [-c | --replace] [file...]",
        program
    );
    eprintln!("       {} -l", program);
    eprintln!();
    eprintln!("Options:");
    eprintln!("  -f, --from-code <encoding>  Source encoding");
    eprintln!("  -t, --to-code <encoding>    Target encoding");
    eprintln!("  -c                          Omit invalid input from the output");
    eprintln!("      --replace               Replace invalid input instead of failing");
    eprintln!("  -o, --output <file>         Output file (default: stdout)");
    eprintln!("  -l, --list                  List available encodings");
    eprintln!("  -h, --help                  Show this help");
}
