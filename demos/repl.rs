use clap::Parser;
use consxp::ast::{NumericKind, Value};
use consxp::evaluator::{self, Environment};
use consxp::scheme::{ParseConfig, parse_program_with_config, parse_scheme_with_config};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::process;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "repl", about = "ConsXP: minimal Scheme-like arithmetic interpreter")]
struct Cli {
    /// Evaluate a program and exit
    #[arg(short, long)]
    eval: Option<String>,

    /// Numeric kind used by the arithmetic procedures
    #[arg(short, long, default_value_t = NumericKind::Integer)]
    kind: NumericKind,

    /// Log evaluation steps
    #[arg(short, long)]
    verbose: bool,
}

const CONFIG: ParseConfig = ParseConfig {
    handle_comments: true,
};

fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { Level::DEBUG } else { Level::WARN };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set up logging: {err}");
    }

    let env = evaluator::create_global_env_with(cli.kind);

    if let Some(source) = &cli.eval {
        let result = parse_program_with_config(source, CONFIG)
            .and_then(|program| evaluator::eval_program(&program, &env));
        match result {
            Ok(value) => println!("{value}"),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
        return;
    }

    if let Err(err) = run_repl(env, cli.kind) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run_repl(mut env: Environment, mut kind: NumericKind) -> Result<(), ReadlineError> {
    println!("ConsXP arithmetic interpreter ({kind} arithmetic)");
    println!("Enter S-expressions like: (+ (+ 3 4) 5) or (* (2 . 3))");
    println!("Type :help for more commands, :q or Ctrl+D to exit.");
    println!();

    let mut rl = DefaultEditor::new()?;

    loop {
        let line = match rl.readline("=> ") {
            Ok(line) => line,
            Err(ReadlineError::Eof | ReadlineError::Interrupted) => {
                println!("Goodbye!");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(line);

        match line.split_once(char::is_whitespace).unwrap_or((line, "")) {
            (":q" | ":quit", _) => {
                println!("Goodbye!");
                return Ok(());
            }
            (":help", _) => {
                print_help();
                continue;
            }
            (":env", _) => {
                print_environment(&env);
                continue;
            }
            (":kind", "") => {
                println!("Numeric kind: {kind}");
                continue;
            }
            (":kind", name) => {
                match name.trim().parse::<NumericKind>() {
                    Ok(new_kind) => {
                        kind = new_kind;
                        env = evaluator::create_global_env_with(kind);
                        println!("Arithmetic now uses {kind} numbers");
                    }
                    Err(e) => println!("Error: {e}"),
                }
                continue;
            }
            _ => {}
        }

        let result =
            parse_scheme_with_config(line, CONFIG).and_then(|expr| evaluator::eval(&expr, &env));
        match result {
            Ok(value) => println!("{value}"),
            Err(e) => println!("Error: {e}"),
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  :help         - Show this help message");
    println!("  :env          - Show current environment bindings");
    println!("  :kind [NAME]  - Show or switch the numeric kind");
    println!(
        "                  ({})",
        NumericKind::ALL.map(NumericKind::name).join(", ")
    );
    println!("  :q, :quit     - Exit the interpreter");
    println!("  Ctrl+D        - Exit the interpreter");
    println!();
    println!("Literals:");
    println!("  Integers: 42, -5, #x1F");
    println!("  Rationals: 3/4, -1/2");
    println!("  Reals: 1.5, .25, 2.");
    println!("  Pairs: (3 . 4)");
    println!("  Empty list: ()");
    println!();
    println!("Examples:");
    println!("  (+ 1 2 3)        ; 6");
    println!("  (- 1 2 3)        ; -4");
    println!("  (+ (3 . 4))      ; 7");
    println!("  (*)              ; 1");
    println!();
}

fn print_environment(env: &Environment) {
    let bindings = env.get_all_bindings();

    if bindings.is_empty() {
        println!("Environment is empty.");
        return;
    }

    println!("Environment bindings ({} total):", bindings.len());
    for (name, value) in bindings {
        match value {
            Value::Procedure(_) => println!("  {name:<6} {value}"),
            other => println!("  {name:<6} = {other}"),
        }
    }
}
