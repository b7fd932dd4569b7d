use std::io::Write;
use tokio::io::AsyncBufReadExt;
use webask_core::QueryOptions;

use crate::config::Config;
use crate::pipeline::Pipeline;

/// Interactive REPL around the query pipeline.
///
/// Session defaults (result count, model, context visibility) live here and
/// are only changed by `config set`; inline flags on a `search` command
/// apply to that invocation alone and never leak into the defaults.
pub struct Shell {
    cfg: Config,
    search_name: String,
    backend_name: String,
    defaults: SessionDefaults,
    pipeline: Pipeline,
}

#[derive(Debug, Clone)]
struct SessionDefaults {
    num_results: usize,
    show_context: bool,
    model: Option<String>,
}

/// One parsed `search` command: the query plus its effective options.
#[derive(Debug)]
struct SearchInvocation {
    query: String,
    opts: QueryOptions,
    model: Option<String>,
}

fn parse_search_args(
    arg: &str,
    defaults: &SessionDefaults,
) -> Result<SearchInvocation, String> {
    let mut opts = QueryOptions {
        num_results: defaults.num_results,
        show_context: defaults.show_context,
    };
    let mut model = defaults.model.clone();
    let mut query_parts: Vec<&str> = Vec::new();

    let mut words = arg.split_whitespace();
    while let Some(word) = words.next() {
        if word == "--show-context" {
            opts.show_context = true;
        } else if let Some(v) = word.strip_prefix("--results=") {
            opts.num_results = v
                .parse()
                .map_err(|_| format!("invalid --results value: {v}"))?;
        } else if word == "--results" {
            let v = words.next().ok_or("--results needs a value")?;
            opts.num_results = v
                .parse()
                .map_err(|_| format!("invalid --results value: {v}"))?;
        } else if let Some(v) = word.strip_prefix("--model=") {
            model = Some(v.to_string());
        } else if word == "--model" {
            let v = words.next().ok_or("--model needs a value")?;
            model = Some(v.to_string());
        } else {
            query_parts.push(word);
        }
    }

    let query = query_parts.join(" ");
    if query.is_empty() {
        return Err("please provide a search query".to_string());
    }
    Ok(SearchInvocation { query, opts, model })
}

impl Shell {
    /// Build the shell, validating backend configuration up front so a
    /// missing credential fails at startup rather than on the first query.
    pub fn new(
        cfg: Config,
        search_name: String,
        backend_name: String,
        num_results: usize,
        model: Option<String>,
    ) -> anyhow::Result<Self> {
        let defaults = SessionDefaults {
            num_results,
            show_context: false,
            model,
        };
        let pipeline = Pipeline::build(&cfg, &search_name, &backend_name, defaults.model.as_deref())?;
        Ok(Self {
            cfg,
            search_name,
            backend_name,
            defaults,
            pipeline,
        })
    }

    pub async fn run(mut self) -> anyhow::Result<()> {
        println!("Welcome to the webask shell. Type `search <query>`, or `help` to list commands.");
        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
        loop {
            print!("webask> ");
            std::io::stdout().flush()?;
            let Some(line) = lines.next_line().await? else {
                // EOF (ctrl-d).
                println!();
                break;
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            match cmd {
                "search" | "s" => self.do_search(rest).await,
                "config" => self.do_config(rest),
                "help" | "?" => print_help(),
                "exit" | "quit" | "q" => {
                    println!("Goodbye!");
                    break;
                }
                other => println!("Unknown command: {other}. Type `help` to list commands."),
            }
        }
        Ok(())
    }

    async fn do_search(&self, arg: &str) {
        let invocation = match parse_search_args(arg, &self.defaults) {
            Ok(inv) => inv,
            Err(msg) => {
                println!("{msg}");
                return;
            }
        };

        // A per-invocation model override needs its own pipeline; the
        // session pipeline keeps serving the defaults.
        let one_off;
        let pipeline = if invocation.model.as_deref() == self.defaults.model.as_deref() {
            &self.pipeline
        } else {
            match Pipeline::build(
                &self.cfg,
                &self.search_name,
                &self.backend_name,
                invocation.model.as_deref(),
            ) {
                Ok(p) => {
                    one_off = p;
                    &one_off
                }
                Err(e) => {
                    println!("Error: {e}");
                    return;
                }
            }
        };

        println!("\nSearching web using model '{}'...", pipeline.model());
        let context = pipeline
            .assemble(&invocation.query, invocation.opts.num_results)
            .await;

        if invocation.opts.show_context {
            println!("\nContext gathered from web:");
            println!("{context}");
            println!("\nGenerating response...");
        }

        let answer = pipeline.answer(&invocation.query, &context).await;
        println!("\nResponse:");
        println!("{answer}");
        println!();
    }

    fn do_config(&mut self, arg: &str) {
        let parts: Vec<&str> = arg.split_whitespace().collect();
        match parts.as_slice() {
            [] | ["show"] => {
                println!("Current configuration:");
                println!("Model: {}", self.pipeline.model());
                println!("Number of results: {}", self.defaults.num_results);
                println!("Show context: {}", self.defaults.show_context);
            }
            ["set", param, value] => match *param {
                "results" => match value.parse() {
                    Ok(n) => {
                        self.defaults.num_results = n;
                        println!("Updated results to {n}");
                    }
                    Err(_) => println!("Invalid results value: {value}"),
                },
                "show_context" => {
                    self.defaults.show_context = value.eq_ignore_ascii_case("true");
                    println!("Updated show_context to {}", self.defaults.show_context);
                }
                "model" => {
                    match Pipeline::build(
                        &self.cfg,
                        &self.search_name,
                        &self.backend_name,
                        Some(value),
                    ) {
                        Ok(p) => {
                            self.defaults.model = Some(value.to_string());
                            self.pipeline = p;
                            println!("Updated model to {value}");
                        }
                        Err(e) => println!("Error: {e}"),
                    }
                }
                other => println!("Unknown config parameter: {other}"),
            },
            _ => println!("Invalid config command. Use `config show` or `config set <param> <value>`"),
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  search <query> [--show-context] [--results=N] [--model=NAME]   answer a query (alias: s)");
    println!("  config [show|set <param> <value>]                              session defaults (results, model, show_context)");
    println!("  help                                                           this message (alias: ?)");
    println!("  exit                                                           leave the shell (aliases: quit, q)");
}
