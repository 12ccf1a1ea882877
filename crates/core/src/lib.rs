pub mod domain;
pub mod error;
pub mod ingest;
pub mod reduce;
pub mod render;
pub mod report;
pub mod time;

pub mod config {
    use anyhow::Context;

    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";
    pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; pricegap/0.1)";

    // NIFTY 50 constituents. The duplicate LT.NS is intentional; the table shows it twice.
    pub const DEFAULT_TICKERS: &[&str] = &[
        "LT.NS", "ONGC.NS", "NTPC.NS", "SBIN.NS", "TATAMOTORS.NS", "KOTAKBANK.NS",
        "HEROMOTOCO.NS", "DIVISLAB.NS", "BPCL.NS", "ICICIBANK.NS", "ITC.NS", "BHARTIARTL.NS",
        "APOLLOHOSP.NS", "ADANIENT.NS", "MARUTI.NS", "CIPLA.NS", "EICHERMOT.NS",
        "BAJFINANCE.NS", "POWERGRID.NS", "BAJAJ-AUTO.NS", "NESTLEIND.NS", "TATASTEEL.NS",
        "COALINDIA.NS", "ASIANPAINT.NS", "SUNPHARMA.NS", "BAJAJFINSV.NS", "TITAN.NS",
        "ADANIPORTS.NS", "BRITANNIA.NS", "AXISBANK.NS", "HDFCBANK.NS", "UPL.NS", "GRASIM.NS",
        "LT.NS", "DRREDDY.NS", "INDUSINDBK.NS", "ULTRACEMCO.NS", "JSWSTEEL.NS", "SBILIFE.NS",
        "M&M.NS", "HINDALCO.NS", "HDFCLIFE.NS", "TECHM.NS", "TATACONSUM.NS", "RELIANCE.NS",
        "TCS.NS", "WIPRO.NS", "HCLTECH.NS", "HINDUNILVR.NS", "INFY.NS",
    ];

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub port: u16,
        pub tickers: Vec<String>,
        pub yahoo_base_url: String,
        pub yahoo_user_agent: String,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> anyhow::Result<Self> {
            let port = match std::env::var("PORT").ok() {
                Some(s) => s
                    .trim()
                    .parse::<u16>()
                    .with_context(|| format!("PORT must be a valid port number (got {s:?})"))?,
                None => DEFAULT_PORT,
            };

            let tickers = match std::env::var("TICKERS").ok() {
                Some(s) => parse_ticker_list(&s)?,
                None => default_tickers(),
            };

            Ok(Self {
                port,
                tickers,
                yahoo_base_url: std::env::var("YAHOO_BASE_URL")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_YAHOO_BASE_URL.to_string()),
                yahoo_user_agent: std::env::var("YAHOO_USER_AGENT")
                    .ok()
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            })
        }
    }

    pub fn default_tickers() -> Vec<String> {
        DEFAULT_TICKERS.iter().map(|s| s.to_string()).collect()
    }

    /// Splits a comma-separated symbol list. Order and duplicates are kept.
    pub fn parse_ticker_list(raw: &str) -> anyhow::Result<Vec<String>> {
        let tickers: Vec<String> = raw
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        anyhow::ensure!(!tickers.is_empty(), "ticker list must contain at least one symbol");
        Ok(tickers)
    }

}
