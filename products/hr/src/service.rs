//! Fixture-backed entity services.
//!
//! Every operation works on a copy of the seed data: filtering never
//! mutates it and writes return computed records without persisting them.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, instrument};

use crate::{
    config::Latency,
    error::{HrError, HrResult},
    model::{
        Department, DepartmentPatch, EntityKind, Employee, EmployeePatch, NewDepartment,
        NewEmployee, NewPosition, Position, PositionPatch,
    },
};

/// A record type that can be listed, searched and written through a
/// [`FixtureService`].
pub trait Record: Clone + Serialize + Send + Sync + 'static {
    type Draft: DeserializeOwned + Send + 'static;
    type Patch: DeserializeOwned + Send + 'static;

    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Text fields matched by the free-text search.
    fn search_fields(&self) -> Vec<&str>;

    fn status_label(&self) -> &'static str;

    /// Department display name, if the record carries one.
    fn department_label(&self) -> Option<&str>;

    /// Key that must stay unique across records (email, code or title).
    fn natural_key(&self) -> &str;

    fn draft_key(draft: &Self::Draft) -> &str;

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: Self::Draft) -> Self;

    fn apply_patch(&mut self, patch: Self::Patch);
}

impl Record for Employee {
    type Draft = NewEmployee;
    type Patch = EmployeePatch;

    const KIND: EntityKind = EntityKind::Employee;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.name, &self.email, &self.position]
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }

    fn department_label(&self) -> Option<&str> {
        Some(&self.department)
    }

    fn natural_key(&self) -> &str {
        &self.email
    }

    fn draft_key(draft: &NewEmployee) -> &str {
        &draft.email
    }

    fn from_draft(id: String, _created_at: DateTime<Utc>, draft: NewEmployee) -> Self {
        Employee {
            id,
            name: draft.name,
            email: draft.email,
            position: draft.position,
            department: draft.department,
            status: draft.status,
            join_date: draft.join_date,
            image_url: draft.image_url,
            phone_number: draft.phone_number,
            notes: draft.notes,
        }
    }

    fn apply_patch(&mut self, patch: EmployeePatch) {
        self.apply(patch);
    }
}

impl Record for Department {
    type Draft = NewDepartment;
    type Patch = DepartmentPatch;

    const KIND: EntityKind = EntityKind::Department;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![
            self.name.as_str(),
            self.code.as_str(),
            self.description.as_str(),
        ];
        if let Some(manager) = self.manager_name.as_deref() {
            fields.push(manager);
        }
        fields
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }

    fn department_label(&self) -> Option<&str> {
        None
    }

    fn natural_key(&self) -> &str {
        &self.code
    }

    fn draft_key(draft: &NewDepartment) -> &str {
        &draft.code
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: NewDepartment) -> Self {
        Department {
            id,
            name: draft.name,
            code: draft.code,
            description: draft.description,
            manager_id: draft.manager_id,
            manager_name: draft.manager_name,
            employee_count: draft.employee_count,
            status: draft.status,
            created_at,
        }
    }

    fn apply_patch(&mut self, patch: DepartmentPatch) {
        self.apply(patch);
    }
}

impl Record for Position {
    type Draft = NewPosition;
    type Patch = PositionPatch;

    const KIND: EntityKind = EntityKind::Position;

    fn id(&self) -> &str {
        &self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![&self.title, &self.department, &self.description]
    }

    fn status_label(&self) -> &'static str {
        self.status.as_str()
    }

    fn department_label(&self) -> Option<&str> {
        Some(&self.department)
    }

    fn natural_key(&self) -> &str {
        &self.title
    }

    fn draft_key(draft: &NewPosition) -> &str {
        &draft.title
    }

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: NewPosition) -> Self {
        Position {
            id,
            title: draft.title,
            department: draft.department,
            employee_count: draft.employee_count,
            min_salary: draft.min_salary,
            max_salary: draft.max_salary,
            status: draft.status,
            created_at,
            description: draft.description,
        }
    }

    fn apply_patch(&mut self, patch: PositionPatch) {
        self.apply(patch);
    }
}

fn default_page() -> u32 {
    1
}

fn default_page_size() -> u32 {
    10
}

/// Parameters of a list request. `page` is 1-based.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(default_page(), default_page_size())
    }
}

impl ListQuery {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page,
            page_size,
            search: None,
            status: None,
            department: None,
        }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_department(mut self, department: impl Into<String>) -> Self {
        self.department = Some(department.into());
        self
    }

    pub fn validate(&self) -> HrResult<()> {
        if self.page == 0 {
            return Err(HrError::InvalidQuery("page must be at least 1".into()));
        }
        if self.page_size == 0 {
            return Err(HrError::InvalidQuery("pageSize must be at least 1".into()));
        }
        Ok(())
    }

    /// Lowercased search needle; blank input means no search.
    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }

    fn filter_value(value: &Option<String>) -> Option<&str> {
        value.as_deref().filter(|s| !s.is_empty())
    }

    pub fn matches<T: Record>(&self, record: &T) -> bool {
        let search_ok = self.needle().is_none_or(|needle| {
            record
                .search_fields()
                .iter()
                .any(|field| field.to_lowercase().contains(&needle))
        });
        let status_ok =
            Self::filter_value(&self.status).is_none_or(|status| record.status_label() == status);
        // Records without a department label are not subject to the filter.
        let department_ok = match (Self::filter_value(&self.department), record.department_label())
        {
            (Some(wanted), Some(actual)) => wanted == actual,
            _ => true,
        };
        search_ok && status_ok && department_ok
    }
}

/// One page of results plus the filtered total.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
        }
    }
}

/// `ceil(total / page_size)`; zero when nothing matched.
pub fn total_pages(total: usize, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total.div_ceil(page_size as usize);
    u32::try_from(pages).unwrap_or(u32::MAX)
}

#[async_trait]
pub trait EntityService<T: Record>: Send + Sync {
    async fn list(&self, query: &ListQuery) -> HrResult<Page<T>>;

    async fn get_by_id(&self, id: &str) -> HrResult<Option<T>>;

    /// Returns the record that would be created. Nothing is stored.
    async fn create(&self, draft: T::Draft) -> HrResult<T>;

    /// Returns the merged record, or `None` for an unknown id. Nothing is stored.
    async fn update(&self, id: &str, patch: T::Patch) -> HrResult<Option<T>>;

    /// Reports whether the id exists. Nothing is removed.
    async fn delete(&self, id: &str) -> HrResult<bool>;
}

type Adjuster<T> = Arc<dyn Fn(&mut T) + Send + Sync>;

/// Entity service over an immutable fixture.
pub struct FixtureService<T: Record> {
    records: Arc<[T]>,
    latency: Latency,
    adjust: Option<Adjuster<T>>,
}

impl<T: Record> Clone for FixtureService<T> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
            latency: self.latency,
            adjust: self.adjust.clone(),
        }
    }
}

impl<T: Record> FixtureService<T> {
    pub fn new(records: Vec<T>, latency: Latency) -> Self {
        Self {
            records: records.into(),
            latency,
            adjust: None,
        }
    }

    /// Post-process every record handed out, e.g. to derive counters.
    pub fn with_adjuster(mut self, adjust: impl Fn(&mut T) + Send + Sync + 'static) -> Self {
        self.adjust = Some(Arc::new(adjust));
        self
    }

    fn emit(&self, record: &T) -> T {
        let mut owned = record.clone();
        if let Some(adjust) = &self.adjust {
            adjust(&mut owned);
        }
        owned
    }

    fn find(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|record| record.id() == id)
    }

    /// Synchronous core of [`EntityService::list`].
    pub fn query(&self, query: &ListQuery) -> HrResult<Page<T>> {
        query.validate()?;
        let filtered: Vec<&T> = self
            .records
            .iter()
            .filter(|record| query.matches(*record))
            .collect();
        let total = filtered.len();
        let start = (query.page as usize - 1).saturating_mul(query.page_size as usize);
        let items = filtered
            .into_iter()
            .skip(start)
            .take(query.page_size as usize)
            .map(|record| self.emit(record))
            .collect();
        Ok(Page { items, total })
    }
}

#[async_trait]
impl<T: Record> EntityService<T> for FixtureService<T> {
    #[instrument(name = "hr.list", skip_all, fields(kind = T::KIND.as_str(), page = query.page))]
    async fn list(&self, query: &ListQuery) -> HrResult<Page<T>> {
        Latency::wait(self.latency.list).await;
        let page = self.query(query)?;
        debug!(total = page.total, returned = page.items.len(), "list resolved");
        Ok(page)
    }

    #[instrument(name = "hr.get", skip(self), fields(kind = T::KIND.as_str()))]
    async fn get_by_id(&self, id: &str) -> HrResult<Option<T>> {
        Latency::wait(self.latency.get).await;
        Ok(self.find(id).map(|record| self.emit(record)))
    }

    #[instrument(name = "hr.create", skip_all, fields(kind = T::KIND.as_str()))]
    async fn create(&self, draft: T::Draft) -> HrResult<T> {
        Latency::wait(self.latency.write).await;
        let key = T::draft_key(&draft);
        if self
            .records
            .iter()
            .any(|record| record.natural_key().eq_ignore_ascii_case(key))
        {
            return Err(HrError::Conflict {
                kind: T::KIND,
                key: key.to_string(),
            });
        }
        let id = (self.records.len() + 1).to_string();
        debug!(%id, "computed record for create; fixture unchanged");
        Ok(T::from_draft(id, Utc::now(), draft))
    }

    #[instrument(name = "hr.update", skip(self, patch), fields(kind = T::KIND.as_str()))]
    async fn update(&self, id: &str, patch: T::Patch) -> HrResult<Option<T>> {
        Latency::wait(self.latency.write).await;
        Ok(self.find(id).map(|record| {
            let mut merged = self.emit(record);
            merged.apply_patch(patch);
            merged
        }))
    }

    #[instrument(name = "hr.delete", skip(self), fields(kind = T::KIND.as_str()))]
    async fn delete(&self, id: &str) -> HrResult<bool> {
        Latency::wait(self.latency.write).await;
        Ok(self.find(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures, model::DepartmentStatus};

    fn departments() -> FixtureService<Department> {
        FixtureService::new(fixtures::departments(), Latency::none())
    }

    fn employees() -> FixtureService<Employee> {
        FixtureService::new(fixtures::employees(), Latency::none())
    }

    #[tokio::test]
    async fn eight_departments_split_over_two_pages() {
        let service = departments();
        let first = service.list(&ListQuery::new(1, 5)).await.unwrap();
        assert_eq!(first.items.len(), 5);
        assert_eq!(first.total, 8);
        assert_eq!(total_pages(first.total, 5), 2);

        let second = service.list(&ListQuery::new(2, 5)).await.unwrap();
        let ids: Vec<&str> = second.items.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["6", "7", "8"]);
    }

    #[tokio::test]
    async fn out_of_range_page_is_empty_not_an_error() {
        let page = departments().list(&ListQuery::new(9, 5)).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 8);
    }

    #[tokio::test]
    async fn zero_page_is_rejected() {
        let err = departments().list(&ListQuery::new(0, 5)).await.unwrap_err();
        assert!(matches!(err, HrError::InvalidQuery(_)));
    }

    #[tokio::test]
    async fn search_is_case_insensitive_across_manager_name() {
        let page = departments()
            .list(&ListQuery::new(1, 10).with_search("  THOMAS "))
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].code, "CS");
    }

    #[tokio::test]
    async fn status_filter_applies_after_search() {
        let page = departments()
            .list(
                &ListQuery::new(1, 10)
                    .with_search("support")
                    .with_status("active"),
            )
            .await
            .unwrap();
        assert_eq!(page.total, 0);
        let inactive = departments()
            .list(&ListQuery::new(1, 10).with_status("inactive"))
            .await
            .unwrap();
        assert_eq!(inactive.items[0].status, DepartmentStatus::Inactive);
    }

    #[tokio::test]
    async fn department_filter_matches_employee_labels_exactly() {
        let page = employees()
            .list(&ListQuery::new(1, 20).with_department("Information Technology"))
            .await
            .unwrap();
        assert_eq!(page.total, 5);
        assert!(
            page.items
                .iter()
                .all(|e| e.department == "Information Technology")
        );
        let none = employees()
            .list(&ListQuery::new(1, 20).with_department("information technology"))
            .await
            .unwrap();
        assert_eq!(none.total, 0);
    }

    #[tokio::test]
    async fn unmatched_search_returns_empty_page() {
        let page = employees()
            .list(&ListQuery::new(1, 5).with_search("zzz-nobody"))
            .await
            .unwrap();
        assert_eq!(page, Page::empty());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_natural_key() {
        let draft = NewDepartment {
            name: "Another HR".into(),
            code: "hr".into(),
            description: String::new(),
            manager_id: None,
            manager_name: None,
            employee_count: 0,
            status: DepartmentStatus::Active,
        };
        let err = departments().create(draft).await.unwrap_err();
        assert!(matches!(err, HrError::Conflict { .. }));
    }

    #[tokio::test]
    async fn writes_do_not_touch_the_fixture() {
        let service = departments();
        let draft = NewDepartment {
            name: "Legal".into(),
            code: "LGL".into(),
            description: "Contracts and compliance".into(),
            manager_id: None,
            manager_name: None,
            employee_count: 0,
            status: DepartmentStatus::Active,
        };
        let created = service.create(draft).await.unwrap();
        assert_eq!(created.id, "9");

        let patch = DepartmentPatch {
            name: Some("People".into()),
            ..Default::default()
        };
        let updated = service.update("1", patch).await.unwrap().unwrap();
        assert_eq!(updated.name, "People");
        assert!(service.delete("1").await.unwrap());
        assert!(!service.delete("99").await.unwrap());

        let after = service.list(&ListQuery::new(1, 20)).await.unwrap();
        assert_eq!(after.total, 8);
        assert_eq!(after.items[0].name, "Human Resources");
    }

    #[tokio::test]
    async fn update_of_unknown_id_is_none() {
        let result = employees()
            .update("404", EmployeePatch::default())
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn list_waits_for_simulated_latency() {
        let service = FixtureService::new(
            fixtures::departments(),
            Latency::for_kind(EntityKind::Department),
        );
        let started = tokio::time::Instant::now();
        service.list(&ListQuery::new(1, 5)).await.unwrap();
        assert!(started.elapsed() >= std::time::Duration::from_millis(500));
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 5), 0);
        assert_eq!(total_pages(5, 5), 1);
        assert_eq!(total_pages(11, 5), 3);
    }
}
