use std::collections::HashMap;
use wiki_iwd::{
    Dispatcher, Title,
    config::{self, Callbacks},
    report::{self, Interwiki},
};

fn usage<T>(err: &'static str) -> anyhow::Result<T> {
    let exe = std::env::args().next().unwrap_or_default();
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("Usage: {exe} [options] <prefix:key>...\n");
    println!("or, use environment variables:");
    println!("    IWD_RULES");
    println!("    IWD_SITES\n");
    println!("Options:");
    println!("    --rules: JSON rule list (interwiki prefixes in lower case)");
    println!("    --sites: Local database names, one per line");
    println!("    --query: Query string to append (default: none)");
    println!("    --namespace: Namespace text of the titles (default: none)");
    println!("    --table: Print the rule table as HTML instead\n");
    Err(anyhow::Error::msg(err))
}

fn opt_path(
    args: &mut pico_args::Arguments,
    option: &'static str,
    key: &str,
) -> anyhow::Result<Option<String>> {
    if let Some(arg) = args.opt_value_from_str::<_, String>(option)? {
        Ok(Some(arg))
    } else {
        Ok(std::env::var(key).ok())
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let mut args = pico_args::Arguments::from_env();
    if args.contains(["-h", "--help"]) {
        return usage("Help requested");
    }
    let table = args.contains("--table");
    let query = args
        .opt_value_from_str::<_, String>("--query")?
        .unwrap_or_default();
    let namespace = args
        .opt_value_from_str::<_, String>("--namespace")?
        .unwrap_or_default();
    let Some(rules_path) = opt_path(&mut args, "--rules", "IWD_RULES")? else {
        return usage("Missing rule list");
    };
    let sites_path = opt_path(&mut args, "--sites", "IWD_SITES")?;
    let _ = args.contains("--");

    let titles = args.finish();

    let rules = config::load_rules(&rules_path, &Callbacks::new())?;
    let known = sites_path
        .map(config::load_known_sites)
        .transpose()?
        .unwrap_or_default();
    log::info!(
        "Loaded {} rules and {} known sites",
        rules.len(),
        known.len()
    );

    if table {
        // Without an interwiki table to consult, every prefix a rule hooks
        // into is assumed to exist and allow transclusion
        let lookup = rules
            .iter()
            .map(|rule| {
                let entry = Interwiki { transcludable: true };
                (rule.interwiki().to_string(), entry)
            })
            .collect::<HashMap<_, _>>();
        println!("{}", report::render_table(&report::summarize(&rules, &lookup)));
        return Ok(());
    }

    if titles.is_empty() {
        return usage("Missing title argument");
    }

    let dispatcher = Dispatcher::new(rules, known);
    for title in titles {
        let Some(title) = title.to_str() else {
            log::warn!("Skipping non-UTF-8 title {title:?}");
            continue;
        };
        let title = Title::new(title).with_namespace(&namespace);
        match dispatcher.resolve(&title, &query) {
            Some(url) => println!("{url}"),
            None => println!("-"),
        }
    }

    Ok(())
}
