//! Configuration and connectivity diagnostics

use crate::server::config::AppConfig;
use crate::server::load_config;
use crate::server::providers::{build_backend, build_registry};
use pcos_llm::util::mask_api_key;
use pcos_llm::ModelParams;
use std::io::Write;
use std::path::Path;

pub async fn run() -> anyhow::Result<()> {
    println!("🏥 PCOS Care Doctor\n");

    step("Checking .env file... ");
    if Path::new(".env").exists() {
        println!("✅ found");
    } else {
        println!("⚠️  not found (environment variables only)");
    }

    step("Loading configuration... ");
    let config = match load_config() {
        Ok(config) => {
            println!("✅ ok");
            config
        }
        Err(e) => {
            println!("❌ {:#}", e);
            anyhow::bail!("configuration is invalid");
        }
    };

    let mut all_ok = true;
    all_ok &= check_agents(&config);
    all_ok &= check_llm_key(&config);
    if all_ok {
        all_ok &= check_connection(&config).await;
    }
    check_search(&config);

    println!();
    if all_ok {
        println!("✅ All checks passed! Ready to run PCOS Care.");
        Ok(())
    } else {
        println!("⚠️  Some checks failed. Please fix the issues above.");
        anyhow::bail!("doctor found problems")
    }
}

/// Print a check label and flush so it shows while the check runs
fn step(label: &str) {
    print!("{}", label);
    let _ = std::io::stdout().flush();
}

fn check_agents(config: &AppConfig) -> bool {
    step("Checking agents... ");
    match build_registry(config) {
        Ok(registry) => {
            let names: Vec<String> = registry.list().map(|p| p.name).collect();
            println!("✅ {}", names.join(", "));
            true
        }
        Err(e) => {
            println!("❌ {:#}", e);
            false
        }
    }
}

fn check_llm_key(config: &AppConfig) -> bool {
    step("Checking LLM provider... ");
    if config.llm.provider == "mock" {
        println!("⚠️  mock provider (offline replies)");
        return true;
    }
    match config.llm.api_key() {
        Some(key) => {
            println!("✅ {} ({})", config.llm.provider, mask_api_key(&key));
            true
        }
        None => {
            println!("❌ no API key. Set PCOS_LLM__PROVIDER_API_KEY or GOOGLE_GEMINI_API_KEY");
            false
        }
    }
}

async fn check_connection(config: &AppConfig) -> bool {
    step("Testing connection... ");
    let backend = match build_backend(config) {
        Ok(backend) => backend,
        Err(e) => {
            println!("❌ {:#}", e);
            return false;
        }
    };
    let params = ModelParams::default().with_max_tokens(16);
    match backend
        .generate("Test connection. Reply with OK.", "", &params)
        .await
    {
        Ok(reply) => {
            println!("✅ {} replied ({} chars)", backend.model(), reply.len());
            true
        }
        Err(e) => {
            println!("❌ {}", e);
            false
        }
    }
}

fn check_search(config: &AppConfig) {
    step("Checking research search... ");
    match &config.search.api_url {
        Some(url) if !url.trim().is_empty() => println!("✅ {}", url),
        _ => println!("⚠️  search.api_url not set (/api/search disabled)"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::loader::default_config;

    #[test]
    fn test_mock_provider_needs_no_key() {
        let mut config = default_config();
        config.llm.provider = "mock".to_string();
        config.llm.provider_api_key = None;
        assert!(check_llm_key(&config));
        assert!(check_agents(&config));
    }

    #[tokio::test]
    async fn test_connection_check_with_mock_provider() {
        let mut config = default_config();
        config.llm.provider = "mock".to_string();
        assert!(check_connection(&config).await);
    }
}
