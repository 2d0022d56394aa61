//! HR vertical slice: employee, department and position directories.
//!
//! Records are served from in-memory fixtures through [`EntityService`]
//! implementations that simulate network latency. List screens are driven
//! by a [`ListController`] per entity.

pub mod config;
pub mod controller;
pub mod error;
pub mod fixtures;
pub mod model;
pub mod pagination;
pub mod providers;
pub mod render;
pub mod service;
pub mod view;

use std::{collections::HashMap, sync::Arc};

pub use config::{CountMode, HrConfig, Latency};
pub use controller::{ControllerOptions, ListController, ListEvent, ListState};
pub use error::{HrError, HrResult};
pub use model::{Department, EntityKind, Employee, Position};
pub use providers::{Preferences, ThemeMode};
pub use service::{EntityService, FixtureService, ListQuery, Page, Record};
pub use view::ViewMode;

/// Entry point wiring the fixture services for all three entities.
#[derive(Clone)]
pub struct HrModule {
    config: HrConfig,
    employees: Arc<FixtureService<Employee>>,
    departments: Arc<FixtureService<Department>>,
    positions: Arc<FixtureService<Position>>,
}

impl Default for HrModule {
    fn default() -> Self {
        Self::new(HrConfig::default())
    }
}

impl HrModule {
    pub fn new(config: HrConfig) -> Self {
        let employees = fixtures::employees();
        let mut departments = FixtureService::new(
            fixtures::departments(),
            config.latency(EntityKind::Department),
        );
        let mut positions =
            FixtureService::new(fixtures::positions(), config.latency(EntityKind::Position));

        if config.count_mode == CountMode::Derived {
            let by_department = Arc::new(tally(employees.iter().map(|e| e.department.as_str())));
            let by_position = Arc::new(tally(employees.iter().map(|e| e.position.as_str())));
            departments = departments.with_adjuster(move |dept: &mut Department| {
                dept.employee_count = by_department.get(&dept.name).copied().unwrap_or(0);
            });
            positions = positions.with_adjuster(move |position: &mut Position| {
                position.employee_count = by_position.get(&position.title).copied().unwrap_or(0);
            });
        }

        let employees = FixtureService::new(employees, config.latency(EntityKind::Employee));
        Self {
            config,
            employees: Arc::new(employees),
            departments: Arc::new(departments),
            positions: Arc::new(positions),
        }
    }

    pub fn config(&self) -> &HrConfig {
        &self.config
    }

    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions::from(&self.config)
    }

    pub fn employees(&self) -> Arc<dyn EntityService<Employee>> {
        self.employees.clone()
    }

    pub fn departments(&self) -> Arc<dyn EntityService<Department>> {
        self.departments.clone()
    }

    pub fn positions(&self) -> Arc<dyn EntityService<Position>> {
        self.positions.clone()
    }
}

/// Count occurrences of each display name.
fn tally<'a>(names: impl Iterator<Item = &'a str>) -> HashMap<String, u32> {
    let mut counts = HashMap::new();
    for name in names {
        *counts.entry(name.to_string()).or_insert(0) += 1;
    }
    counts
}
