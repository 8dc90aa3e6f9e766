use log::*;

const DEFAULT_BASE_URL: &str = "http://localhost:5000";
const DEFAULT_SEARCH_PATH: &str = "/find_price";
const DEFAULT_DIRECT_PATH: &str = "/scrape_direct_url";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub base_url: String,
    pub search_path: String,
    pub direct_path: String,
    /// Overall request timeout. A hung remote call is aborted by this and nothing else.
    pub request_timeout_secs: u64,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            direct_path: DEFAULT_DIRECT_PATH.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ScraperConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("PW_SCRAPER_BASE_URL").unwrap_or_else(|_| {
            warn!("PW_SCRAPER_BASE_URL not set, using {DEFAULT_BASE_URL} as default");
            DEFAULT_BASE_URL.to_string()
        });
        let search_path = std::env::var("PW_SCRAPER_SEARCH_PATH").unwrap_or_else(|_| DEFAULT_SEARCH_PATH.to_string());
        let direct_path = std::env::var("PW_SCRAPER_DIRECT_PATH").unwrap_or_else(|_| DEFAULT_DIRECT_PATH.to_string());
        let request_timeout_secs = std::env::var("PW_SCRAPER_TIMEOUT_SECS")
            .ok()
            .map(|s| {
                s.parse::<u64>().unwrap_or_else(|e| {
                    warn!("{s} is not a valid value for PW_SCRAPER_TIMEOUT_SECS. {e}. Using {DEFAULT_TIMEOUT_SECS}.");
                    DEFAULT_TIMEOUT_SECS
                })
            })
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        Self { base_url, search_path, direct_path, request_timeout_secs }
    }

    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url, self.search_path)
    }

    pub fn direct_url(&self) -> String {
        format!("{}{}", self.base_url, self.direct_path)
    }
}

#[cfg(test)]
mod test {
    use super::ScraperConfig;

    #[test]
    fn urls_are_joined_from_base_and_path() {
        let config = ScraperConfig { base_url: "http://scraper:5000".to_string(), ..Default::default() };
        assert_eq!(config.search_url(), "http://scraper:5000/find_price");
        assert_eq!(config.direct_url(), "http://scraper:5000/scrape_direct_url");
    }
}
