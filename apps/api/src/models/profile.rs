use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Currencies a candidate may price interviews in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "GBP")]
    Gbp,
}

impl Currency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Gbp => "GBP",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "USD" => Some(Currency::Usd),
            "EUR" => Some(Currency::Eur),
            "GBP" => Some(Currency::Gbp),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub role: String,
    pub years_of_experience: i32,
    pub location: String,
    pub interview_rate: i32,
    /// Empty until the candidate picks a currency.
    pub interview_rate_currency: String,
    pub is_published: bool,
    pub published_at: Option<DateTime<Utc>>,
    pub published_link: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What anonymous visitors see at `/@{published_link}`. Carries no user id or email.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub name: String,
    pub role: String,
    pub years_of_experience: i32,
    pub location: String,
    pub interview_rate: i32,
    pub interview_rate_currency: String,
    pub published_link: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl From<Profile> for PublicProfile {
    fn from(p: Profile) -> Self {
        PublicProfile {
            name: p.name,
            role: p.role,
            years_of_experience: p.years_of_experience,
            location: p.location,
            interview_rate: p.interview_rate,
            interview_rate_currency: p.interview_rate_currency,
            published_link: p.published_link,
            published_at: p.published_at,
        }
    }
}
