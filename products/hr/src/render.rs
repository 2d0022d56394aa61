//! Plain-text rendering of list state for terminals.

use std::fmt::Write as _;

use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, presets::UTF8_FULL_CONDENSED};

use crate::{
    controller::ListState,
    model::{Department, Employee, Position},
    pagination::{self, PageToken},
    service::Record,
    view::ViewMode,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tone {
    Success,
    Danger,
    Warning,
    Neutral,
}

impl Tone {
    pub fn color(self) -> Color {
        match self {
            Tone::Success => Color::Green,
            Tone::Danger => Color::Red,
            Tone::Warning => Color::Yellow,
            Tone::Neutral => Color::Grey,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub tone: Tone,
}

impl Badge {
    pub fn for_status(status: &str) -> Self {
        let lower = status.to_lowercase();
        let tone = match lower.as_str() {
            "active" => Tone::Success,
            "inactive" => Tone::Danger,
            "on-leave" => Tone::Warning,
            _ => Tone::Neutral,
        };
        let mut chars = lower.chars();
        let text = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        Self { text, tone }
    }

    fn cell(self) -> Cell {
        Cell::new(self.text).fg(self.tone.color())
    }
}

/// Table and card layout for one record type.
pub trait Presentable: Record {
    fn columns() -> &'static [&'static str];

    fn cells(&self) -> Vec<Cell>;

    fn card_title(&self) -> String;

    fn card_lines(&self) -> Vec<String>;
}

impl Presentable for Employee {
    fn columns() -> &'static [&'static str] {
        &["Employee", "Position", "Department", "Status", "Join Date"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::new(format!("{} <{}>", self.name, self.email)),
            Cell::new(&self.position),
            Cell::new(&self.department),
            Badge::for_status(self.status.as_str()).cell(),
            Cell::new(self.join_date.format("%Y-%m-%d")),
        ]
    }

    fn card_title(&self) -> String {
        self.name.clone()
    }

    fn card_lines(&self) -> Vec<String> {
        let mut lines = vec![
            format!("{} · {}", self.position, self.department),
            self.email.clone(),
        ];
        if let Some(phone) = &self.phone_number {
            lines.push(phone.clone());
        }
        lines.push(format!(
            "{} since {}",
            Badge::for_status(self.status.as_str()).text,
            self.join_date.format("%b %-d, %Y")
        ));
        lines
    }
}

impl Presentable for Department {
    fn columns() -> &'static [&'static str] {
        &["Department", "Manager", "Employees", "Status", "Created"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::new(format!("{} ({})", self.name, self.code)),
            Cell::new(self.manager_name.as_deref().unwrap_or("-")),
            Cell::new(self.employee_count).set_alignment(CellAlignment::Right),
            Badge::for_status(self.status.as_str()).cell(),
            Cell::new(self.created_at.format("%Y-%m-%d")),
        ]
    }

    fn card_title(&self) -> String {
        format!("{} ({})", self.name, self.code)
    }

    fn card_lines(&self) -> Vec<String> {
        vec![
            self.description.clone(),
            format!(
                "Manager: {}",
                self.manager_name.as_deref().unwrap_or("unassigned")
            ),
            format!(
                "{} employees · {}",
                self.employee_count,
                Badge::for_status(self.status.as_str()).text
            ),
        ]
    }
}

impl Presentable for Position {
    fn columns() -> &'static [&'static str] {
        &["Title", "Department", "Salary", "Status"]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::new(&self.title),
            Cell::new(&self.department),
            Cell::new(salary_range(self.min_salary, self.max_salary))
                .set_alignment(CellAlignment::Right),
            Badge::for_status(self.status.as_str()).cell(),
        ]
    }

    fn card_title(&self) -> String {
        self.title.clone()
    }

    fn card_lines(&self) -> Vec<String> {
        vec![
            self.department.clone(),
            self.description.clone(),
            format!(
                "{} · {} employees",
                salary_range(self.min_salary, self.max_salary),
                self.employee_count
            ),
        ]
    }
}

fn salary_range(min: u32, max: u32) -> String {
    format!("${} - ${}", thousands(min), thousands(max))
}

fn thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn checkbox(checked: bool) -> &'static str {
    if checked { "[x]" } else { "[ ]" }
}

/// Table view; the first column is the selection checkbox.
pub fn render_table<T: Presentable>(state: &ListState<T>) -> String {
    let mut header = vec![Cell::new(checkbox(state.select_all))];
    header.extend(
        T::columns()
            .iter()
            .map(|column| Cell::new(column).add_attribute(Attribute::Bold)),
    );

    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED).set_header(header);
    for item in &state.items {
        let mut row = vec![Cell::new(checkbox(state.is_selected(item.id())))];
        row.extend(item.cells());
        table.add_row(row);
    }
    format!("{table}\n")
}

pub fn render_cards<T: Presentable>(state: &ListState<T>) -> String {
    let mut out = String::new();
    for item in &state.items {
        let _ = writeln!(
            out,
            "{} {}",
            checkbox(state.is_selected(item.id())),
            item.card_title()
        );
        for line in item.card_lines() {
            let _ = writeln!(out, "    {line}");
        }
        out.push('\n');
    }
    out
}

/// `‹ 1 … 4 [5] 6 … 10 ›`; empty for a single page.
pub fn render_pagination(current: u32, total_pages: u32) -> String {
    let tokens = pagination::page_tokens(current, total_pages);
    if tokens.is_empty() {
        return String::new();
    }
    let mut parts = vec!["‹".to_string()];
    parts.extend(tokens.into_iter().map(|token| match token {
        PageToken::Page(page) if page == current => format!("[{page}]"),
        PageToken::Page(page) => page.to_string(),
        PageToken::Ellipsis => "…".to_string(),
    }));
    parts.push("›".to_string());
    parts.join(" ")
}

pub fn render_no_data<T: Record>() -> String {
    format!(
        "No {} found\nThere are no items to display at this time.\n",
        T::KIND.as_str()
    )
}

/// Full screen for a list: status line, items in the chosen view, pager.
pub fn render_state<T: Presentable>(state: &ListState<T>) -> String {
    let kind = T::KIND.as_str();
    let mut out = String::new();
    if let Some(error) = &state.last_error {
        let _ = writeln!(out, "! could not load {kind}: {error} (type `retry`)");
    }
    if state.loading && state.items.is_empty() {
        let _ = writeln!(out, "Loading {kind}...");
        return out;
    }
    if state.shows_no_data() {
        out.push_str(&render_no_data::<T>());
        return out;
    }

    match state.view_mode {
        ViewMode::List => out.push_str(&render_table(state)),
        ViewMode::Card => out.push_str(&render_cards(state)),
    }
    let pager = render_pagination(state.current_page, state.total_pages);
    if !pager.is_empty() {
        let _ = writeln!(out, "{pager}");
    }
    let _ = write!(
        out,
        "page {} of {} · {} {kind}",
        state.current_page,
        state.total_pages.max(1),
        state.total
    );
    if !state.selected_ids.is_empty() {
        let _ = write!(out, " · {} selected", state.selected_ids.len());
    }
    if state.loading {
        out.push_str(" · loading");
    }
    out.push('\n');
    out
}
