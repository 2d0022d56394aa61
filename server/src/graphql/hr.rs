use std::sync::Arc;

use async_graphql::{Context, ErrorExtensions, Object, OutputType, SimpleObject};
use platform_api::ApiError;
use products_hr::{
    Department, Employee, EntityService, HrModule, ListQuery, Position, Record,
    service::total_pages,
};
use tracing::instrument;

use crate::error::api_error;

#[derive(Clone, Debug, SimpleObject)]
pub struct EmployeeNode {
    pub id: String,
    pub name: String,
    pub email: String,
    pub position: String,
    pub department: String,
    pub status: String,
    pub join_date: String,
    pub image_url: Option<String>,
    pub phone_number: Option<String>,
    pub notes: Option<String>,
}

impl From<Employee> for EmployeeNode {
    fn from(value: Employee) -> Self {
        Self {
            status: value.status.as_str().to_string(),
            join_date: value.join_date.to_string(),
            id: value.id,
            name: value.name,
            email: value.email,
            position: value.position,
            department: value.department,
            image_url: value.image_url,
            phone_number: value.phone_number,
            notes: value.notes,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct DepartmentNode {
    pub id: String,
    pub name: String,
    pub code: String,
    pub description: String,
    pub manager_id: Option<String>,
    pub manager_name: Option<String>,
    pub employee_count: u32,
    pub status: String,
    pub created_at: String,
}

impl From<Department> for DepartmentNode {
    fn from(value: Department) -> Self {
        Self {
            status: value.status.as_str().to_string(),
            created_at: value.created_at.to_rfc3339(),
            id: value.id,
            name: value.name,
            code: value.code,
            description: value.description,
            manager_id: value.manager_id,
            manager_name: value.manager_name,
            employee_count: value.employee_count,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
pub struct PositionNode {
    pub id: String,
    pub title: String,
    pub department: String,
    pub employee_count: u32,
    pub min_salary: u32,
    pub max_salary: u32,
    pub status: String,
    pub created_at: String,
    pub description: String,
}

impl From<Position> for PositionNode {
    fn from(value: Position) -> Self {
        Self {
            status: value.status.as_str().to_string(),
            created_at: value.created_at.to_rfc3339(),
            id: value.id,
            title: value.title,
            department: value.department,
            employee_count: value.employee_count,
            min_salary: value.min_salary,
            max_salary: value.max_salary,
            description: value.description,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(concrete(name = "EmployeePage", params(EmployeeNode)))]
#[graphql(concrete(name = "DepartmentPage", params(DepartmentNode)))]
#[graphql(concrete(name = "PositionPage", params(PositionNode)))]
pub struct PageNode<N: OutputType> {
    pub items: Vec<N>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

/// Read-only HR directory queries.
pub struct HrQuery;

fn hr_module<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a HrModule> {
    ctx.data::<HrModule>()
        .map_err(|_| ApiError::internal(anyhow::anyhow!("hr module not registered")).extend())
}

fn list_query(
    page: u32,
    page_size: u32,
    search: Option<String>,
    status: Option<String>,
    department: Option<String>,
) -> ListQuery {
    ListQuery {
        page,
        page_size,
        search,
        status,
        department,
    }
}

async fn list_nodes<T, N>(
    service: Arc<dyn EntityService<T>>,
    query: ListQuery,
) -> async_graphql::Result<PageNode<N>>
where
    T: Record,
    N: OutputType + From<T>,
{
    let page = service
        .list(&query)
        .await
        .map_err(|err| api_error(err).extend())?;
    Ok(PageNode {
        total_pages: total_pages(page.total, query.page_size),
        total: page.total as u64,
        items: page.items.into_iter().map(N::from).collect(),
        page: query.page,
        page_size: query.page_size,
    })
}

async fn find_node<T, N>(
    service: Arc<dyn EntityService<T>>,
    id: &str,
) -> async_graphql::Result<Option<N>>
where
    T: Record,
    N: From<T>,
{
    let record = service
        .get_by_id(id)
        .await
        .map_err(|err| api_error(err).extend())?;
    Ok(record.map(N::from))
}

#[Object]
impl HrQuery {
    #[instrument(name = "graphql.hr.employees", skip_all)]
    async fn employees(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 1)] page: u32,
        #[graphql(default = 10)] page_size: u32,
        search: Option<String>,
        status: Option<String>,
        department: Option<String>,
    ) -> async_graphql::Result<PageNode<EmployeeNode>> {
        let query = list_query(page, page_size, search, status, department);
        list_nodes(hr_module(ctx)?.employees(), query).await
    }

    #[instrument(name = "graphql.hr.departments", skip_all)]
    async fn departments(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 1)] page: u32,
        #[graphql(default = 10)] page_size: u32,
        search: Option<String>,
        status: Option<String>,
        department: Option<String>,
    ) -> async_graphql::Result<PageNode<DepartmentNode>> {
        let query = list_query(page, page_size, search, status, department);
        list_nodes(hr_module(ctx)?.departments(), query).await
    }

    #[instrument(name = "graphql.hr.positions", skip_all)]
    async fn positions(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 1)] page: u32,
        #[graphql(default = 10)] page_size: u32,
        search: Option<String>,
        status: Option<String>,
        department: Option<String>,
    ) -> async_graphql::Result<PageNode<PositionNode>> {
        let query = list_query(page, page_size, search, status, department);
        list_nodes(hr_module(ctx)?.positions(), query).await
    }

    #[instrument(name = "graphql.hr.employee", skip_all)]
    async fn employee(
        &self,
        ctx: &Context<'_>,
        id: String,
    ) -> async_graphql::Result<Option<EmployeeNode>> {
        find_node(hr_module(ctx)?.employees(), &id).await
    }

    #[instrument(name = "graphql.hr.department", skip_all)]
    async fn department(
        &self,
        ctx: &Context<'_>,
        id: String,
    ) -> async_graphql::Result<Option<DepartmentNode>> {
        find_node(hr_module(ctx)?.departments(), &id).await
    }

    #[instrument(name = "graphql.hr.position", skip_all)]
    async fn position(
        &self,
        ctx: &Context<'_>,
        id: String,
    ) -> async_graphql::Result<Option<PositionNode>> {
        find_node(hr_module(ctx)?.positions(), &id).await
    }
}
