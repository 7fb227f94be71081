use clap::Parser;
use medfinder::core::request::RadiusInput;
use medfinder::utils::{logger, validation::Validate};
use medfinder::{CliConfig, DiscoveryEngine, DiscoveryRequest, DiscoveryResult, ErrorKind};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger();
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting medfinder CLI");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match cli.service_config().and_then(|c| c.validate().map(|_| c)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Configuration validation failed: {}", e);
            tracing::error!("Suggestion: {}", e.recovery_suggestion());
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    let engine = DiscoveryEngine::from_config(&config)?;

    let result = match &cli.request {
        Some(path) => {
            let body = tokio::fs::read_to_string(path).await?;
            engine.discover_json(&body).await
        }
        None => {
            let request = DiscoveryRequest {
                address: cli.address.clone(),
                radius: cli.radius.map(RadiusInput::Integer),
            };
            engine.discover(request).await
        }
    };

    println!("{}", result.to_json(cli.pretty)?);

    // 根據錯誤類型決定退出碼
    let exit_code = match &result {
        DiscoveryResult::Success(_) => 0,
        DiscoveryResult::Failure(payload) => match payload.kind {
            ErrorKind::InputError => 2,
            ErrorKind::LocationNotFound | ErrorKind::GeocodingError => 3,
            ErrorKind::SpatialRateLimited
            | ErrorKind::SpatialTimeout
            | ErrorKind::SpatialProviderError => 4,
            ErrorKind::Internal => 1,
        },
    };

    if exit_code > 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}
