//! Search configuration and parameter strings.

use thiserror::Error;

/// Errors raised while reading a parameter string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    /// A token is not of the form `key:value`.
    #[error("malformed parameter '{0}', expected key:value")]
    Malformed(String),
    /// The key is not a known parameter.
    #[error("unknown parameter '{0}'")]
    UnknownKey(String),
    /// The value cannot be parsed for this key.
    #[error("invalid value '{value}' for parameter '{key}'")]
    InvalidValue { key: String, value: String },
    /// The parameters parse but are inconsistent.
    #[error("invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Configuration of the bundled search engine.
///
/// # Examples
///
/// ```
/// use u_cpmodel::solver::SearchConfig;
///
/// let config = SearchConfig::default()
///     .with_max_time_in_seconds(5.0)
///     .with_stop_after_first_solution(true)
///     .with_random_seed(7);
/// assert!(config.validate().is_ok());
///
/// let parsed = SearchConfig::from_parameters("max_time_in_seconds:5 stop_after_first_solution:true random_seed:7").unwrap();
/// assert_eq!(parsed, config);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    /// Wall-clock budget in seconds. `None` = no limit.
    pub max_time_in_seconds: Option<f64>,

    /// Budget on search nodes (branches). `None` = no limit.
    pub max_number_of_nodes: Option<u64>,

    /// Stop at the first solution instead of proving optimality.
    pub stop_after_first_solution: bool,

    /// Seed used when `randomize_search` is on.
    pub random_seed: Option<u64>,

    /// Shuffle the variable branching order.
    pub randomize_search: bool,

    /// Number of workers splitting the root of the search.
    ///
    /// Only honoured with the `parallel` feature.
    pub num_search_workers: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_time_in_seconds: None,
            max_number_of_nodes: None,
            stop_after_first_solution: false,
            random_seed: None,
            randomize_search: false,
            num_search_workers: 1,
        }
    }
}

impl SearchConfig {
    pub fn with_max_time_in_seconds(mut self, seconds: f64) -> Self {
        self.max_time_in_seconds = Some(seconds);
        self
    }

    pub fn with_max_number_of_nodes(mut self, nodes: u64) -> Self {
        self.max_number_of_nodes = Some(nodes);
        self
    }

    pub fn with_stop_after_first_solution(mut self, stop: bool) -> Self {
        self.stop_after_first_solution = stop;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = Some(seed);
        self
    }

    pub fn with_randomize_search(mut self, randomize: bool) -> Self {
        self.randomize_search = randomize;
        self
    }

    pub fn with_num_search_workers(mut self, workers: usize) -> Self {
        self.num_search_workers = workers;
        self
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if let Some(seconds) = self.max_time_in_seconds {
            if !(seconds > 0.0) {
                return Err(ParameterError::Invalid(
                    "max_time_in_seconds must be positive",
                ));
            }
        }
        if self.max_number_of_nodes == Some(0) {
            return Err(ParameterError::Invalid(
                "max_number_of_nodes must be positive or unset",
            ));
        }
        if self.num_search_workers == 0 {
            return Err(ParameterError::Invalid(
                "num_search_workers must be at least 1",
            ));
        }
        Ok(())
    }

    /// Builds a configuration from a parameter string.
    ///
    /// The string is a list of `key:value` pairs separated by whitespace or
    /// commas; keys are the field names of [`SearchConfig`]. Later pairs
    /// override earlier ones.
    pub fn from_parameters(parameters: &str) -> Result<Self, ParameterError> {
        let mut config = SearchConfig::default();

        for token in parameters
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|token| !token.is_empty())
        {
            let (key, value) = token
                .split_once(':')
                .ok_or_else(|| ParameterError::Malformed(token.to_owned()))?;
            let (key, value) = (key.trim(), value.trim());

            match key {
                "max_time_in_seconds" => {
                    config.max_time_in_seconds = Some(parse_value(key, value)?);
                }
                "max_number_of_nodes" => {
                    config.max_number_of_nodes = Some(parse_value(key, value)?);
                }
                "stop_after_first_solution" => {
                    config.stop_after_first_solution = parse_value(key, value)?;
                }
                "random_seed" => config.random_seed = Some(parse_value(key, value)?),
                "randomize_search" => config.randomize_search = parse_value(key, value)?,
                "num_search_workers" => config.num_search_workers = parse_value(key, value)?,
                _ => return Err(ParameterError::UnknownKey(key.to_owned())),
            }
        }

        config.validate()?;
        Ok(config)
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ParameterError> {
    value.parse().map_err(|_| ParameterError::InvalidValue {
        key: key.to_owned(),
        value: value.to_owned(),
    })
}
