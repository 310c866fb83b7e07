use fx_trader::core::config::AppConfig;
use fx_trader::core::{Catalog, PortfolioStore, Session};
use fx_trader::store::disk::DiskPortfolioStore;
use std::fs;
use std::io::Cursor;
use tempfile::TempDir;
use tracing::{error, info};

mod test_utils {
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    pub async fn create_rates_mock_server(mock_response: &str) -> MockServer {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/latest.json"))
            .and(query_param("app_id", "test-key"))
            .and(query_param("base", "USD"))
            .respond_with(ResponseTemplate::new(200).set_body_string(mock_response))
            .mount(&mock_server)
            .await;

        mock_server
    }
}

const RATES_RESPONSE: &str = r#"{
    "base": "USD",
    "rates": {
        "AUD": 1.5312,
        "CAD": 1.3694,
        "CHF": 0.8841,
        "EUR": 0.9234,
        "GBP": 0.7891,
        "JPY": 151.37
    }
}"#;

fn write_config(dir: &TempDir, base_url: &str) -> AppConfig {
    let config_path = dir.path().join("config.yaml");
    let config_content = format!(
        r#"
        providers:
          open_exchange_rates:
            base_url: {}
            app_id: test-key
        rates_ttl_secs: 5
        data_path: {}
    "#,
        base_url,
        dir.path().join("data").display()
    );
    fs::write(&config_path, config_content).expect("Failed to write config file");
    AppConfig::load_from_path(&config_path).expect("Failed to load config file")
}

async fn run(command: fx_trader::AppCommand, config: &AppConfig, script: &str) -> String {
    let mut output = Vec::new();
    let result =
        fx_trader::run_with_io(command, config, Cursor::new(script.as_bytes()), &mut output).await;
    assert!(result.is_ok(), "Run failed with: {:?}", result.err());
    String::from_utf8(output).expect("Output is not UTF-8")
}

#[test_log::test(tokio::test)]
async fn test_full_trading_session_with_mock() {
    let mock_server = test_utils::create_rates_mock_server(RATES_RESPONSE).await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(&temp_dir, &mock_server.uri());

    // Create and log in alice, then buy and sell EUR
    let script = "2\nalice\n1\nalice\n3\nEUR\n100\ny\n4\neur\n50\ny\n1\nx\n";
    let output = run(fx_trader::AppCommand::Menu, &config, script).await;
    info!(%output, "Menu session finished");

    assert!(output.contains("User alice created!"));
    assert!(output.contains("USD 100.00 @ 0.9234 => EUR 92.34"));
    assert!(output.contains("EUR 50.00 @ 0.9234 => USD 54.14"));
    assert_eq!(output.matches("Confirmed!").count(), 2);

    let store = DiskPortfolioStore::open(&temp_dir.path().join("data").join("portfolio"))
        .expect("Failed to reopen store");
    let catalog = Catalog::standard();
    let session = Session::new("alice").unwrap();
    let balance = |code: &str| {
        store
            .get_balance(&session, catalog.resolve(code).unwrap())
            .unwrap()
            .to_string()
    };
    assert_eq!(balance("USD"), "9954.14");
    assert_eq!(balance("EUR"), "42.34");
    assert_eq!(balance("JPY"), "0");
}

#[test_log::test(tokio::test)]
async fn test_portfolio_command() {
    let mock_server = test_utils::create_rates_mock_server(RATES_RESPONSE).await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(&temp_dir, &mock_server.uri());

    run(fx_trader::AppCommand::Menu, &config, "2\nbob\nx\n").await;

    let output = run(
        fx_trader::AppCommand::Portfolio("BOB".to_string()),
        &config,
        "",
    )
    .await;
    assert!(output.contains("Portfolio [bob]"));
    assert!(output.contains("10000.00"));

    let mut sink = Vec::new();
    let result = fx_trader::run_with_io(
        fx_trader::AppCommand::Portfolio("nobody".to_string()),
        &config,
        Cursor::new(Vec::new()),
        &mut sink,
    )
    .await;
    assert_eq!(
        result.unwrap_err().to_string(),
        "no portfolio for user 'nobody'"
    );
}

#[test_log::test(tokio::test)]
async fn test_rates_command() {
    let mock_server = test_utils::create_rates_mock_server(RATES_RESPONSE).await;
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let config = write_config(&temp_dir, &mock_server.uri());

    let output = run(fx_trader::AppCommand::Rates, &config, "").await;
    assert!(output.contains("1 USD ="));
    for code in ["AUD", "CAD", "CHF", "EUR", "GBP", "JPY"] {
        assert!(output.contains(code), "{code} missing from rates table");
    }
}

#[test_log::test(tokio::test)]
#[ignore = "needs network access and OER_API_KEY"]
async fn test_real_open_exchange_rates_api() {
    use fx_trader::core::RateProvider;
    use fx_trader::core::cache::Cache;
    use fx_trader::providers::OpenExchangeRatesProvider;
    use std::sync::Arc;
    use std::time::Duration;

    let config = AppConfig::default();
    let api_key = config.api_key().expect("OER_API_KEY must be set");
    let cache = Arc::new(Cache::new(Duration::from_secs(60)));
    let provider = OpenExchangeRatesProvider::new(
        &config.providers.open_exchange_rates.base_url,
        &api_key,
        Catalog::standard(),
        cache,
    )
    .unwrap();

    match provider.get_rates().await {
        Ok(rates) => {
            info!(?rates, "Received successful rates response");
            assert_eq!(rates.len(), 6);
            assert!(rates.values().all(|rate| rate.is_sign_positive()));
        }
        Err(e) => {
            error!("Rates API request failed: {e}\n{e:?}");
            panic!("Rates API request failed: {e}");
        }
    }
}
