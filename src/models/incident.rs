//! Traffic incidents and the category filter applied to them

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::TrafficPulseError;

/// Incident category, also used as a filter tag
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IncidentCategory {
    Accident,
    Construction,
    Congestion,
    Weather,
    Event,
}

impl IncidentCategory {
    pub const ALL: [IncidentCategory; 5] = [
        IncidentCategory::Accident,
        IncidentCategory::Construction,
        IncidentCategory::Congestion,
        IncidentCategory::Weather,
        IncidentCategory::Event,
    ];

    /// Tag used by the filter toggles
    #[must_use]
    pub fn filter_tag(self) -> &'static str {
        match self {
            IncidentCategory::Accident => "accidents",
            IncidentCategory::Construction => "construction",
            IncidentCategory::Congestion => "congestion",
            IncidentCategory::Weather => "weather",
            IncidentCategory::Event => "events",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            IncidentCategory::Accident => "Accidents",
            IncidentCategory::Construction => "Construction",
            IncidentCategory::Congestion => "Congestion",
            IncidentCategory::Weather => "Weather",
            IncidentCategory::Event => "Events",
        }
    }
}

impl FromStr for IncidentCategory {
    type Err = TrafficPulseError;

    /// Accepts both filter tags (`accidents`) and category names (`accident`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accident" | "accidents" => Ok(IncidentCategory::Accident),
            "construction" => Ok(IncidentCategory::Construction),
            "congestion" => Ok(IncidentCategory::Congestion),
            "weather" => Ok(IncidentCategory::Weather),
            "event" | "events" => Ok(IncidentCategory::Event),
            other => Err(TrafficPulseError::validation(format!(
                "Unknown incident filter '{other}'"
            ))),
        }
    }
}

impl fmt::Display for IncidentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filter_tag())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// A reported traffic incident
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Incident {
    pub id: String,
    pub category: IncidentCategory,
    pub description: String,
    /// Road or area the incident was reported at
    pub location: String,
    pub severity: Severity,
    /// Local time the incident was reported, as shown to users
    pub reported_at: String,
}

/// Active incident-category filters. An empty set shows everything.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct DashboardFilterSet(BTreeSet<IncidentCategory>);

impl DashboardFilterSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a list of filter tags, rejecting unknown ones
    pub fn parse<I, S>(tags: I) -> crate::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        tags.into_iter()
            .filter(|tag| !tag.as_ref().trim().is_empty())
            .map(|tag| tag.as_ref().parse::<IncidentCategory>())
            .collect::<crate::Result<BTreeSet<_>>>()
            .map(Self)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn contains(&self, category: IncidentCategory) -> bool {
        self.0.contains(&category)
    }

    /// Flip a single category on or off
    pub fn toggle(&mut self, category: IncidentCategory) {
        if !self.0.remove(&category) {
            self.0.insert(category);
        }
    }

    /// Whether an incident passes the filter
    #[must_use]
    pub fn matches(&self, incident: &Incident) -> bool {
        self.is_empty() || self.contains(incident.category)
    }

    /// The subset of `incidents` that passes the filter, in input order
    #[must_use]
    pub fn apply<'a>(&self, incidents: &'a [Incident]) -> Vec<&'a Incident> {
        incidents.iter().filter(|i| self.matches(i)).collect()
    }

    /// Filter tags in a stable order
    #[must_use]
    pub fn tags(&self) -> Vec<&'static str> {
        self.0.iter().map(|c| c.filter_tag()).collect()
    }
}

impl FromIterator<IncidentCategory> for DashboardFilterSet {
    fn from_iter<T: IntoIterator<Item = IncidentCategory>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
