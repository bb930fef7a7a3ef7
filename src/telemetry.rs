//! Tracing setup.
//!
//! `LOG_LEVEL` takes full `EnvFilter` directives; without it we log the service at
//! debug, keep the outbound client at info (one line per inference call) and
//! leave extractor block-skipping at debug. `LOG_FORMAT=json` switches to
//! structured output for log shippers.

use tracing_subscriber::EnvFilter;

const DEFAULT_DIRECTIVES: &str =
    "info,quizgen=debug,quizgen_backend::inference=info,tower_http=info,axum=info,reqwest=warn";

fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
}

pub fn init_tracing() {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_from_env())
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    if matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json")) {
        builder.json().flatten_event(true).init();
    } else {
        builder.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_directives_parse() {
        assert!(DEFAULT_DIRECTIVES.parse::<EnvFilter>().is_ok());
    }
}
