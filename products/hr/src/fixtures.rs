//! Seed data standing in for the employee, department and position tables.
//!
//! Positions reference departments ("Engineering", "Design", "Product",
//! "Executive") that have no department record; that drift is part of the
//! sample data.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::model::{
    Department, DepartmentStatus, Employee, EmployeeStatus, Position, PositionStatus,
};

fn naive_date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid seed date")
}

fn timestamp(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid seed timestamp")
}

#[allow(clippy::too_many_arguments)]
fn employee(
    id: &str,
    name: &str,
    email: &str,
    position: &str,
    department: &str,
    status: EmployeeStatus,
    join_date: NaiveDate,
    phone_number: Option<&str>,
) -> Employee {
    Employee {
        id: id.into(),
        name: name.into(),
        email: email.into(),
        position: position.into(),
        department: department.into(),
        status,
        join_date,
        image_url: None,
        phone_number: phone_number.map(Into::into),
        notes: None,
    }
}

pub fn employees() -> Vec<Employee> {
    use EmployeeStatus::*;
    let mut rows = vec![
        employee(
            "1",
            "John Doe",
            "john.doe@example.com",
            "Frontend Developer",
            "Information Technology",
            Active,
            naive_date(2021, 1, 15),
            Some("+1 555 0101"),
        ),
        employee(
            "2",
            "Jane Smith",
            "jane.smith@example.com",
            "HR Specialist",
            "Human Resources",
            Active,
            naive_date(2020, 3, 22),
            Some("+1 555 0102"),
        ),
        employee(
            "3",
            "Mike Johnson",
            "mike.johnson@example.com",
            "Backend Developer",
            "Information Technology",
            Active,
            naive_date(2019, 7, 1),
            None,
        ),
        employee(
            "4",
            "Sarah Williams",
            "sarah.williams@example.com",
            "Financial Analyst",
            "Finance",
            Active,
            naive_date(2018, 11, 5),
            Some("+1 555 0104"),
        ),
        employee(
            "5",
            "David Brown",
            "david.brown@example.com",
            "Marketing Specialist",
            "Marketing",
            OnLeave,
            naive_date(2020, 6, 10),
            None,
        ),
        employee(
            "6",
            "Jennifer Lee",
            "jennifer.lee@example.com",
            "Sales Representative",
            "Sales",
            Active,
            naive_date(2019, 2, 18),
            Some("+1 555 0106"),
        ),
        employee(
            "7",
            "Robert Chen",
            "robert.chen@example.com",
            "Project Manager",
            "Operations",
            Active,
            naive_date(2017, 9, 12),
            None,
        ),
        employee(
            "8",
            "Emily Wilson",
            "emily.wilson@example.com",
            "Data Scientist",
            "Research & Development",
            Active,
            naive_date(2021, 4, 3),
            Some("+1 555 0108"),
        ),
        employee(
            "9",
            "Thomas Garcia",
            "thomas.garcia@example.com",
            "Customer Support Representative",
            "Customer Support",
            Inactive,
            naive_date(2018, 1, 29),
            None,
        ),
        employee(
            "10",
            "Olivia Martinez",
            "olivia.martinez@example.com",
            "UX Designer",
            "Information Technology",
            Active,
            naive_date(2022, 3, 14),
            None,
        ),
        employee(
            "11",
            "William Taylor",
            "william.taylor@example.com",
            "DevOps Engineer",
            "Information Technology",
            OnLeave,
            naive_date(2020, 10, 1),
            Some("+1 555 0111"),
        ),
        employee(
            "12",
            "Sophia Anderson",
            "sophia.anderson@example.com",
            "QA Engineer",
            "Information Technology",
            Active,
            naive_date(2022, 8, 22),
            None,
        ),
        employee(
            "13",
            "James Thomas",
            "james.thomas@example.com",
            "Sales Representative",
            "Sales",
            Inactive,
            naive_date(2019, 5, 6),
            None,
        ),
        employee(
            "14",
            "Ava Jackson",
            "ava.jackson@example.com",
            "HR Specialist",
            "Human Resources",
            Active,
            naive_date(2023, 1, 9),
            Some("+1 555 0114"),
        ),
    ];
    rows[1].notes = Some("Leads the onboarding programme.".into());
    rows[4].notes = Some("Parental leave until end of quarter.".into());
    rows
}

#[allow(clippy::too_many_arguments)]
fn department(
    id: &str,
    name: &str,
    code: &str,
    description: &str,
    manager: Option<(&str, &str)>,
    employee_count: u32,
    status: DepartmentStatus,
) -> Department {
    Department {
        id: id.into(),
        name: name.into(),
        code: code.into(),
        description: description.into(),
        manager_id: manager.map(|(id, _)| id.into()),
        manager_name: manager.map(|(_, name)| name.into()),
        employee_count,
        status,
        created_at: timestamp(2020, 1, 15),
    }
}

pub fn departments() -> Vec<Department> {
    use DepartmentStatus::*;
    vec![
        department(
            "1",
            "Human Resources",
            "HR",
            "Responsible for recruiting, onboarding, and employee relations",
            Some(("2", "Jane Smith")),
            12,
            Active,
        ),
        department(
            "2",
            "Information Technology",
            "IT",
            "Responsible for managing technology infrastructure and software development",
            Some(("3", "Mike Johnson")),
            25,
            Active,
        ),
        department(
            "3",
            "Finance",
            "FIN",
            "Handles company finances, accounting, and payroll",
            Some(("4", "Sarah Williams")),
            15,
            Active,
        ),
        department(
            "4",
            "Marketing",
            "MKT",
            "Handles brand management and marketing campaigns",
            Some(("5", "David Brown")),
            18,
            Active,
        ),
        department(
            "5",
            "Sales",
            "SLS",
            "Responsible for client acquisition and relationship management",
            Some(("6", "Jennifer Lee")),
            20,
            Active,
        ),
        department(
            "6",
            "Operations",
            "OPS",
            "Manages day-to-day business operations",
            Some(("7", "Robert Chen")),
            22,
            Active,
        ),
        department(
            "7",
            "Research & Development",
            "R&D",
            "Focuses on product innovation and development",
            Some(("8", "Emily Wilson")),
            17,
            Active,
        ),
        department(
            "8",
            "Customer Support",
            "CS",
            "Provides assistance and technical support to customers",
            Some(("9", "Thomas Garcia")),
            14,
            Inactive,
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn position(
    id: &str,
    title: &str,
    department: &str,
    employee_count: u32,
    salary: (u32, u32),
    created_at: DateTime<Utc>,
    description: &str,
) -> Position {
    Position {
        id: id.into(),
        title: title.into(),
        department: department.into(),
        employee_count,
        min_salary: salary.0,
        max_salary: salary.1,
        status: PositionStatus::Active,
        created_at,
        description: description.into(),
    }
}

pub fn positions() -> Vec<Position> {
    vec![
        position(
            "1",
            "Frontend Developer",
            "Engineering",
            8,
            (50_000, 90_000),
            timestamp(2022, 1, 15),
            "Responsible for implementing visual elements that users see and interact with in a web application.",
        ),
        position(
            "2",
            "Backend Developer",
            "Engineering",
            10,
            (60_000, 100_000),
            timestamp(2022, 1, 15),
            "Responsible for server-side web application logic and integration with databases.",
        ),
        position(
            "3",
            "Product Manager",
            "Product",
            3,
            (70_000, 120_000),
            timestamp(2022, 2, 10),
            "Responsible for product planning, roadmap development, and feature specification.",
        ),
        position(
            "4",
            "UX Designer",
            "Design",
            4,
            (55_000, 95_000),
            timestamp(2022, 3, 5),
            "Responsible for enhancing user satisfaction with a product by improving the usability and accessibility.",
        ),
        position(
            "5",
            "UI Designer",
            "Design",
            3,
            (50_000, 90_000),
            timestamp(2022, 3, 5),
            "Responsible for designing the visual elements of the user interface and brand identity.",
        ),
        position(
            "6",
            "DevOps Engineer",
            "Engineering",
            5,
            (65_000, 110_000),
            timestamp(2022, 1, 20),
            "Responsible for implementing and maintaining CI/CD pipelines and infrastructure automation.",
        ),
        position(
            "7",
            "QA Engineer",
            "Engineering",
            6,
            (45_000, 85_000),
            timestamp(2022, 1, 25),
            "Responsible for ensuring product quality through manual and automated testing.",
        ),
        position(
            "8",
            "HR Specialist",
            "Human Resources",
            3,
            (40_000, 70_000),
            timestamp(2022, 2, 15),
            "Responsible for recruitment, employee relations, and company culture initiatives.",
        ),
        position(
            "9",
            "Marketing Specialist",
            "Marketing",
            4,
            (45_000, 75_000),
            timestamp(2022, 2, 20),
            "Responsible for developing and implementing marketing strategies to promote the company's products and services.",
        ),
        position(
            "10",
            "Financial Analyst",
            "Finance",
            3,
            (55_000, 90_000),
            timestamp(2022, 3, 1),
            "Responsible for financial planning, analysis, and reporting to support business decisions.",
        ),
        position(
            "11",
            "Customer Support Representative",
            "Customer Support",
            8,
            (35_000, 55_000),
            timestamp(2022, 3, 10),
            "Responsible for addressing customer inquiries, resolving issues, and providing product information.",
        ),
        position(
            "12",
            "Sales Representative",
            "Sales",
            6,
            (40_000, 80_000),
            timestamp(2022, 3, 15),
            "Responsible for selling products or services and building relationships with potential customers.",
        ),
        position(
            "13",
            "Project Manager",
            "Operations",
            3,
            (65_000, 110_000),
            timestamp(2022, 1, 10),
            "Responsible for planning, executing, and closing projects on time and within budget.",
        ),
        position(
            "14",
            "Data Scientist",
            "Research & Development",
            2,
            (70_000, 120_000),
            timestamp(2022, 4, 5),
            "Responsible for analyzing and interpreting complex data to inform business decisions.",
        ),
        position(
            "15",
            "Chief Executive Officer",
            "Executive",
            1,
            (150_000, 300_000),
            timestamp(2020, 1, 1),
            "Responsible for the overall operation, resources, and performance of the company.",
        ),
    ]
}
