//! Command-line entry point: interactive REPL or one-shot query runner.

use hornlog::{Interpreter, ResolverConfig, Solution};
use std::env;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;

struct Options {
    files: Vec<String>,
    query: Option<String>,
    json: bool,
    trace: bool,
    max_depth: Option<usize>,
}

fn usage() {
    println!("Usage: hornlog [FILES...] [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -q, --query GOALS   run the goals against the consulted files and exit");
    println!("      --json          print --query solutions as JSON");
    println!("      --trace         print resolution events to stderr");
    println!("      --depth N       recursion depth limit (default 1000)");
    println!("  -h, --help          show this help");
    println!();
    println!("Without --query an interactive session starts; type :help there.");
}

fn parse_args() -> Result<Options, String> {
    let mut options = Options {
        files: Vec::new(),
        query: None,
        json: false,
        trace: false,
        max_depth: None,
    };
    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-q" | "--query" => {
                options.query = Some(args.next().ok_or("--query needs an argument")?);
            }
            "--json" => options.json = true,
            "--trace" => options.trace = true,
            "--depth" => {
                let value = args.next().ok_or("--depth needs an argument")?;
                options.max_depth =
                    Some(value.parse().map_err(|_| format!("bad depth: {value}"))?);
            }
            "-h" | "--help" => {
                usage();
                std::process::exit(0);
            }
            other if other.starts_with('-') => {
                return Err(format!("unknown option: {other}"));
            }
            file => options.files.push(file.to_string()),
        }
    }
    Ok(options)
}

fn main() -> ExitCode {
    let options = match parse_args() {
        Ok(options) => options,
        Err(message) => {
            eprintln!("error: {message}");
            return ExitCode::FAILURE;
        }
    };

    let mut config = ResolverConfig::default();
    config.trace = options.trace;
    if let Some(depth) = options.max_depth {
        config.max_depth = depth;
    }
    let mut interpreter = Interpreter::with_config(config);

    for file in &options.files {
        match interpreter.load_file(file) {
            Ok(count) => {
                if options.query.is_none() {
                    println!("Loaded {file}: {count} clause(s).");
                }
            }
            Err(err) => {
                eprintln!("error loading {file}: {err}");
                return ExitCode::FAILURE;
            }
        }
    }

    match &options.query {
        Some(query) => run_query(&interpreter, query, options.json),
        None => repl(&mut interpreter),
    }
}

fn run_query(interpreter: &Interpreter, query: &str, json: bool) -> ExitCode {
    match interpreter.query(query) {
        Ok(solutions) => {
            if json {
                match serde_json::to_string_pretty(&solutions) {
                    Ok(rendered) => println!("{rendered}"),
                    Err(err) => {
                        eprintln!("error: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                print_solutions(&solutions);
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn repl(interpreter: &mut Interpreter) -> ExitCode {
    println!("hornlog {}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for commands, or enter clauses and queries.");
    println!();

    let stdin = io::stdin();
    loop {
        print!("?- ");
        if io::stdout().flush().is_err() {
            break;
        }
        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) | Err(_) => break,
            Ok(_) => {}
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == ":quit" || input == ":q" {
            break;
        }
        if !input.starts_with(":-") {
            if let Some(directive) = input.strip_prefix(':') {
                handle_directive(interpreter, directive);
                continue;
            }
        }
        if input.ends_with('.') {
            match interpreter.load_str(input) {
                Ok(count) => println!("Added {count} clause(s)."),
                Err(err) => println!("Error: {err}"),
            }
            continue;
        }
        match interpreter.query(input) {
            Ok(solutions) => print_solutions(&solutions),
            Err(err) => println!("Error: {err}"),
        }
    }
    println!("Goodbye.");
    ExitCode::SUCCESS
}

fn handle_directive(interpreter: &mut Interpreter, directive: &str) {
    let mut parts = directive.splitn(2, char::is_whitespace);
    match (parts.next().unwrap_or(""), parts.next()) {
        ("help" | "h", _) => {
            println!("Commands:");
            println!("  :help, :h      show this help");
            println!("  :quit, :q      exit");
            println!("  :load FILE     consult a Prolog file");
            println!("  :clear         clear the database");
            println!("  :list          list all clauses");
            println!("  :stats         show database statistics");
            println!();
            println!("Input ending with '.' is loaded as a clause; anything");
            println!("else runs as a query.");
        }
        ("load", Some(file)) => match interpreter.load_file(file.trim()) {
            Ok(count) => println!("Loaded {}: {count} clause(s).", file.trim()),
            Err(err) => println!("Error: {err}"),
        },
        ("load", None) => println!("Usage: :load <file>"),
        ("clear", _) => {
            interpreter.clear();
            println!("Database cleared.");
        }
        ("list", _) => {
            for clause in interpreter.database().iter() {
                println!("{clause}");
            }
        }
        ("stats", _) => {
            let stats = interpreter.stats();
            println!("Clauses:    {}", stats.clause_count);
            println!("Predicates: {}", stats.predicate_count);
        }
        (other, _) => {
            println!("Unknown command: :{other}");
            println!("Type :help for available commands.");
        }
    }
}

fn print_solutions(solutions: &[Solution]) {
    if solutions.is_empty() {
        println!("false");
        return;
    }
    for (index, solution) in solutions.iter().enumerate() {
        if index + 1 < solutions.len() {
            println!("{solution} ;");
        } else {
            println!("{solution}");
        }
    }
}
