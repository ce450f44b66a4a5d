use crate::{AutomationError, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const BASE_URL: &str = "https://www.jobserve.com";
pub const SEARCH_URL: &str = "https://www.jobserve.com/gb/en/JobSearch.aspx";
pub const APPLICATIONS_URL: &str = "https://www.jobserve.com/ee/en/can/applications";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobType {
    Any,
    FullTime,
    Contract,
    ContractFullTime,
    PartTime,
}

impl JobType {
    /// Visible text of the job-type option on the search form.
    pub fn as_label(&self) -> &'static str {
        match self {
            Self::Any => "Any",
            Self::FullTime => "Full Time",
            Self::Contract => "Contract",
            Self::ContractFullTime => "Contract/Full Time",
            Self::PartTime => "Part Time/Temporary/Seasonal",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "any" => Some(Self::Any),
            "full time" => Some(Self::FullTime),
            "contract" => Some(Self::Contract),
            "contract/full time" => Some(Self::ContractFullTime),
            "part time/temporary/seasonal" | "part time" => Some(Self::PartTime),
            _ => None,
        }
    }
}

/// Read-only search configuration for one run.
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub keywords: String,
    pub location: String,
    pub job_type: JobType,
    pub distance: String,
    pub max_applications: usize,
    /// A candidate title must contain one of these to be considered.
    pub priority_keywords: Vec<String>,
    /// A candidate title containing one of these is skipped.
    pub exclude_keywords: Vec<String>,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            keywords: "data scientist, AI engineer".to_string(),
            location: "London".to_string(),
            job_type: JobType::ContractFullTime,
            distance: "Within 25 miles".to_string(),
            max_applications: 50,
            priority_keywords: [
                "data scientist",
                "ai engineer",
                "machine learning",
                "data engineer",
                "tech lead",
                "ai developer",
                "data analyst",
                "data",
                "ai",
                "engineer",
                "scientist",
                "tech",
                "lead",
                "analyst",
                "python",
                "sql",
            ]
            .map(String::from)
            .to_vec(),
            exclude_keywords: [
                "senior manager",
                "director",
                "head of",
                "chief",
                "intern",
                "graduate",
            ]
            .map(String::from)
            .to_vec(),
        }
    }
}

/// JobServe account details, sourced from the environment.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    /// Empty when the CV is already stored on JobServe.
    pub cv_path: Option<PathBuf>,
}

impl Credentials {
    pub fn from_env() -> Result<Self> {
        let email = env::var("JOBSERVE_EMAIL")
            .map_err(|_| AutomationError::Config("JOBSERVE_EMAIL is not set".into()))?;
        let password = env::var("JOBSERVE_PASSWORD")
            .map_err(|_| AutomationError::Config("JOBSERVE_PASSWORD is not set".into()))?;
        if email.is_empty() || email == "your_email@example.com" {
            return Err(AutomationError::Config(
                "JOBSERVE_EMAIL still holds the placeholder value".into(),
            ));
        }

        Ok(Self {
            email,
            password,
            first_name: env::var("FIRST_NAME").unwrap_or_default(),
            last_name: env::var("LAST_NAME").unwrap_or_default(),
            cv_path: env::var("CV_PATH").ok().filter(|p| !p.is_empty()).map(PathBuf::from),
        })
    }
}

/// Browser and pacing knobs.
#[derive(Debug, Clone)]
pub struct Settings {
    pub headless: bool,
    /// Cooperative pause after every attempt, regardless of outcome.
    pub delay_between_applications: Duration,
    /// Bound on each navigation / element wait.
    pub step_timeout: Duration,
    pub window_size: (u32, u32),
    pub output_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            headless: false,
            delay_between_applications: Duration::from_secs(5),
            step_timeout: Duration::from_secs(10),
            window_size: (1920, 1080),
            output_dir: PathBuf::from("."),
        }
    }
}
