use clap::{Arg, ArgAction, Command};
use langcache::{FileStore, Settings};
use langcache_mt::{GtxProvider, MachineTranslator, MockMode, MockTranslator, TranslationService};
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("langcache")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate texts through a persistent translation cache")
        .arg(
            Arg::new("text")
                .help("Texts to translate; several texts are translated as one batch")
                .num_args(0..)
                .index(1),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .short('l')
                .help("Target language (default: the selected language)"),
        )
        .arg(
            Arg::new("select")
                .long("select")
                .help("Select and persist a target language"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .short('s')
                .help("Storage directory (default: $LANGCACHE_STORE_DIR or .langcache)"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use mock translator instead of Google Translate")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("stats")
                .long("stats")
                .help("Print cache statistics")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("reset")
                .long("reset")
                .help("Forget every cached translation")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log cache hits, misses and lookups")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    // Initialize tracing
    let default_level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let store_dir = matches
        .get_one::<String>("store")
        .cloned()
        .or_else(|| env::var("LANGCACHE_STORE_DIR").ok())
        .unwrap_or_else(|| ".langcache".to_string());

    let translator: Arc<dyn MachineTranslator> = if matches.get_flag("mock") {
        Arc::new(MockTranslator::new(MockMode::Suffix))
    } else {
        Arc::new(GtxProvider::from_env()?)
    };

    let service = TranslationService::new(
        Settings::from_env()?,
        translator,
        Arc::new(FileStore::new(store_dir)),
    );

    if matches.get_flag("reset") {
        service.reset_cache().await?;
        eprintln!("Cache cleared");
    }

    if let Some(code) = matches.get_one::<String>("select") {
        let language = service.set_language(code).await?;
        eprintln!("Selected language: {}", language);
    }

    let texts: Vec<String> = matches
        .get_many::<String>("text")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();

    if !texts.is_empty() {
        let target = match matches.get_one::<String>("lang") {
            Some(lang) => lang.clone(),
            None => service.language().await.to_string(),
        };

        if texts.len() == 1 {
            println!("{}", service.translate(&texts[0], &target).await);
        } else {
            for translated in service.translate_batch(&texts, &target).await {
                println!("{}", translated);
            }
        }
    }

    if matches.get_flag("stats") {
        let stats = service.cache_stats().await;
        println!(
            "{} cached translations in {} languages",
            stats.entries, stats.languages
        );
        for (language, count) in &stats.per_language {
            println!("  {}: {}", language, count);
        }
    }

    Ok(())
}
