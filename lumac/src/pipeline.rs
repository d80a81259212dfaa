//! Runs one source string through all four pipeline stages, gating each on
//! the previous stage's error list being empty, and prints either the
//! resulting tape or the first failing stage's diagnostics.

use std::path::Path;

use luma_compile::{Compiler, Emitter, TapeEmitter};
use luma_par::Parser as LumaParser;
use luma_sem::Checker;
use luma_util::Diagnostics;
use tracing::info;

use crate::config::Config;
use crate::error::Result;

pub fn run_file(path: &Path, config: &Config) -> Result<bool> {
    let source = std::fs::read_to_string(path)?;
    info!(path = %path.display(), "compiling");
    Ok(compile_and_report(&source, config))
}

pub fn run_repl(config: &Config) -> Result<bool> {
    use std::io::{self, BufRead, Write};

    println!("lumac REPL -- blank line to exit");
    let stdin = io::stdin();
    let mut ok = true;
    loop {
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 || line.trim().is_empty() {
            break;
        }
        ok &= compile_and_report(&line, config);
    }
    Ok(ok)
}

fn compile_and_report(source: &str, config: &Config) -> bool {
    let mut parser = LumaParser::new(source);
    let ast = parser.parse_program();
    if parser.diagnostics().has_errors() {
        report_stage_errors("Parser", parser.diagnostics());
        return false;
    }
    if config.echo_parsed {
        println!("{}", luma_par::pretty_program(&ast));
    }

    let checker = Checker::new(&ast);
    let (types, diagnostics) = checker.check_program();
    if diagnostics.has_errors() {
        report_stage_errors("Type checker", &diagnostics);
        return false;
    }

    let mut emitter = TapeEmitter::new();
    let diagnostics = Compiler::new(&ast, &types).compile(&mut emitter);
    if diagnostics.has_errors() {
        report_stage_errors("Compiler", &diagnostics);
        return false;
    }

    let bytecode = emitter.bytecode();
    for (i, constant) in bytecode.constants.iter().enumerate() {
        println!("const {i}: {constant:?}");
    }
    for (i, instruction) in bytecode.tape.iter().enumerate() {
        println!("{i:>4}: {} {:?}", instruction.opcode, instruction.args);
    }
    true
}

fn report_stage_errors(stage: &str, diagnostics: &Diagnostics) {
    eprintln!("{stage} has errors:");
    for diagnostic in diagnostics.iter() {
        eprintln!("  {diagnostic}");
    }
}
