//! luascriptc: a thin CLI shim around `luascript_compiler::compile`.
//!
//! Takes a JSON-encoded raw parse tree (the output of an external JS
//! parser, dumped to disk) and runs it through the full compile pipeline,
//! printing either generated Lua or a list of errors.

mod tracing_setup;

use luascript_compiler::{compile, from_json, CompileOptions};

fn main() {
    tracing_setup::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "compile" => {
            if args.len() < 3 {
                eprintln!("Usage: luascriptc compile <file.json> [--emit-ir] [--strict] [--no-validate]");
                std::process::exit(1);
            }
            let mut emit_ir = false;
            let mut strict = false;
            let mut validate = true;

            for arg in args.iter().skip(3) {
                match arg.as_str() {
                    "--emit-ir" => emit_ir = true,
                    "--strict" => strict = true,
                    "--no-validate" => validate = false,
                    other => {
                        eprintln!("Unknown option: {other}");
                        std::process::exit(1);
                    }
                }
            }

            compile_file(&args[2], emit_ir, strict, validate);
        }
        "help" | "--help" | "-h" => {
            print_usage();
        }
        "version" | "--version" | "-v" => {
            println!("luascriptc {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

fn print_usage() {
    println!("luascriptc (JavaScript-to-Lua compiler core)");
    println!();
    println!("Usage: luascriptc <command> [options]");
    println!();
    println!("Commands:");
    println!("  compile <file.json>   Compile a JSON-encoded parse tree to Lua");
    println!("  help                  Show this help message");
    println!("  version               Show version information");
    println!();
    println!("Compile options:");
    println!("  --emit-ir             Print the lowered IR as JSON after the generated code");
    println!("  --strict              Promote compatibility-mode warnings to errors");
    println!("  --no-validate         Skip the structural/schema validation pass");
}

fn read_file(path: &str) -> String {
    match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Error reading '{path}': {e}");
            std::process::exit(1);
        }
    }
}

fn compile_file(path: &str, emit_ir: bool, strict: bool, validate: bool) {
    let content = read_file(path);

    let json = match serde_json::from_str::<serde_json::Value>(&content) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error parsing '{path}' as JSON: {e}");
            std::process::exit(1);
        }
    };

    let root = match from_json(&json) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error reading parse tree from '{path}': {e}");
            std::process::exit(1);
        }
    };

    let options = CompileOptions {
        validate,
        strict_mode: strict,
        compatibility_mode: true,
        ..CompileOptions::default()
    };

    let result = compile(&root, &options, None);

    for warning in &result.warnings {
        eprintln!("warning: {warning}");
    }

    if !result.success {
        let phase = result.error_phase.map(|p| format!("{p:?}")).unwrap_or_else(|| "unknown".to_string());
        eprintln!("Compilation failed during {phase}:");
        for error in &result.errors {
            eprintln!("  {error}");
        }
        std::process::exit(1);
    }

    print!("{}", result.code);

    if emit_ir {
        if let Some(ir) = &result.ir {
            match serde_json::to_string_pretty(ir) {
                Ok(json) => {
                    println!();
                    println!("{json}");
                }
                Err(e) => {
                    eprintln!("Error serializing IR: {e}");
                    std::process::exit(1);
                }
            }
        }
    }
}
