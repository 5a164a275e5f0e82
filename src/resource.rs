use crate::duration::{DurationUnits, Hours};
use crate::tidp::Tidp;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Effort booked against one discipline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisciplineAllocation {
    /// Number of TIDPs (task teams) in the discipline.
    pub teams: usize,
    pub containers: usize,
    pub estimated_hours: Hours,
}

/// Busiest due-date month. `period` stays `None` when no container has a due date.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeakUtilization {
    pub period: Option<String>,
    pub resources: Hours,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceAllocation {
    pub by_discipline: BTreeMap<String, DisciplineAllocation>,
    /// Estimated hours keyed by due-date month ("YYYY-MM").
    pub by_period: BTreeMap<String, Hours>,
    pub total_resources: Hours,
    pub peak_utilization: PeakUtilization,
}

pub fn aggregate_resources(tidps: &[Tidp]) -> ResourceAllocation {
    aggregate_resources_with_units(tidps, &DurationUnits::default())
}

pub fn aggregate_resources_with_units(tidps: &[Tidp], units: &DurationUnits) -> ResourceAllocation {
    let mut allocation = ResourceAllocation::default();

    for tidp in tidps {
        let discipline = allocation
            .by_discipline
            .entry(tidp.discipline.clone())
            .or_default();
        discipline.teams += 1;
        discipline.containers += tidp.containers.len();

        for container in &tidp.containers {
            let hours = container.duration_estimate(units).hours;
            discipline.estimated_hours = discipline.estimated_hours.saturating_add(hours);
            allocation.total_resources = allocation.total_resources.saturating_add(hours);

            if let Some(due) = container.due_date {
                let period = due.format("%Y-%m").to_string();
                let booked = allocation.by_period.entry(period).or_default();
                *booked = booked.saturating_add(hours);
            }
        }
    }

    for (period, hours) in &allocation.by_period {
        if allocation.peak_utilization.period.is_none()
            || *hours > allocation.peak_utilization.resources
        {
            allocation.peak_utilization = PeakUtilization {
                period: Some(period.clone()),
                resources: *hours,
            };
        }
    }

    allocation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tidp::Container;
    use chrono::NaiveDate;

    fn due(mut container: Container, y: i32, m: u32, d: u32) -> Container {
        container.due_date = NaiveDate::from_ymd_opt(y, m, d);
        container
    }

    #[test]
    fn groups_by_discipline() {
        let tidps = vec![
            Tidp::new("a", "Arch A", "architecture").with_containers(vec![
                Container::new("1", "M", "2 weeks"),
                Container::new("2", "D", "3 days"),
            ]),
            Tidp::new("b", "Arch B", "architecture")
                .with_containers(vec![Container::new("3", "R", "10 hours")]),
            Tidp::new("c", "Civils", "civil")
                .with_containers(vec![Container::new("4", "S", "n/a")]),
        ];
        let allocation = aggregate_resources(&tidps);

        let arch = &allocation.by_discipline["architecture"];
        assert_eq!((arch.teams, arch.containers, arch.estimated_hours), (2, 3, 114));
        let civil = &allocation.by_discipline["civil"];
        assert_eq!((civil.teams, civil.containers, civil.estimated_hours), (1, 1, 0));
        assert_eq!(allocation.total_resources, 114);
        assert!(allocation.by_period.is_empty());
        assert_eq!(allocation.peak_utilization, PeakUtilization::default());
    }

    #[test]
    fn buckets_due_dates_by_month() {
        let tidps = vec![Tidp::new("a", "Team", "mep").with_containers(vec![
            due(Container::new("1", "A", "1 day"), 2025, 3, 2),
            due(Container::new("2", "B", "2 days"), 2025, 3, 28),
            due(Container::new("3", "C", "1 week"), 2025, 4, 10),
            due(Container::new("4", "D", "1 day"), 2025, 5, 1),
            Container::new("5", "E", "1 week"),
        ])];
        let allocation = aggregate_resources(&tidps);
        assert_eq!(allocation.by_period["2025-03"], 24);
        assert_eq!(allocation.by_period["2025-04"], 40);
        assert_eq!(
            allocation.peak_utilization,
            PeakUtilization {
                period: Some("2025-04".into()),
                resources: 40
            }
        );
        assert_eq!(allocation.total_resources, 112);
    }

    #[test]
    fn peak_ties_keep_earliest_period() {
        let tidps = vec![Tidp::new("a", "Team", "mep").with_containers(vec![
            due(Container::new("1", "A", "1 day"), 2025, 6, 2),
            due(Container::new("2", "B", "1 day"), 2025, 1, 2),
        ])];
        let allocation = aggregate_resources(&tidps);
        assert_eq!(allocation.peak_utilization.period.as_deref(), Some("2025-01"));
    }

    #[test]
    fn empty_input_is_zeroed() {
        assert_eq!(aggregate_resources(&[]), ResourceAllocation::default());
    }
}
