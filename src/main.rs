use std::fs;
use std::io::{self, Read};
use std::rc::Rc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::EnvFilter;

use runbook::doc::MarkdownRenderer;
use runbook::render::to_source;
use runbook::script::{compile_script, execute_compiled, make_default_interpreter};
use runbook::trace::TraceMiddleware;
use runbook::value::Value;

fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let mut render_mode: Option<String> = None;
    let mut trace = false;
    let mut input_path: Option<String> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--render" | "-r" => {
                render_mode = Some(
                    args.next()
                        .ok_or_else(|| anyhow::anyhow!("Missing renderer name after {arg}"))?,
                );
            }
            "--trace" | "-t" => {
                trace = true;
            }
            _ => {
                input_path = Some(arg);
                if args.next().is_some() {
                    bail!("Only one script file is supported");
                }
                break;
            }
        }
    }

    if trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("runbook=trace".parse()?),
            )
            .with_writer(io::stderr)
            .init();
    }

    let source = if let Some(path) = input_path {
        fs::read_to_string(&path).with_context(|| format!("Reading {path}"))?
    } else {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Reading stdin")?;
        buffer
    };

    let nodes = compile_script(&source)?;

    match render_mode.as_deref() {
        Some("sexp") => {
            for node in &nodes {
                println!("{}", to_source(node)?);
            }
        }
        Some("markdown") => {
            let mut renderer = MarkdownRenderer::new();
            renderer.render(&nodes)?;
            println!("{}", renderer.markdown());
        }
        Some(other) => bail!("Unknown renderer '{other}', expected 'sexp' or 'markdown'"),
        None => {
            let mut interpreter = make_default_interpreter();
            if trace {
                interpreter.set_middleware(Rc::new(TraceMiddleware::new()));
            }
            let result = execute_compiled(&nodes, &mut interpreter)?;
            if result != Value::Nothing {
                println!("{result}");
            }
        }
    }

    Ok(())
}
