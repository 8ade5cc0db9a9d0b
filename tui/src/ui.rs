//! Frame rendering. Pure function of the [`App`] state; no IO here.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Tabs};
use ratatui::Frame;

use client::router::{visible_menu, DashboardVariant, Route, ViewKey};
use shared::types::{Course, User};

use crate::app::{App, AuthScreen};
use crate::form::Form;

const ACCENT: Color = Color::Cyan;
const DANGER: Color = Color::Red;
const MUTED: Color = Color::DarkGray;

pub fn draw(frame: &mut Frame, app: &App) {
    match app.route() {
        Route::Loading => draw_centered_notice(frame, "Restoring session..."),
        Route::Login => match app.auth_screen {
            AuthScreen::Login => draw_auth(frame, app, &app.login_form, login_hint()),
            AuthScreen::Register => {
                draw_auth(frame, app, &app.register_form, register_hint(app))
            }
        },
        Route::Denied => draw_centered_notice(
            frame,
            "This account has no dashboard. Press Esc to sign out.",
        ),
        Route::Dashboard(variant) => draw_dashboard(frame, app, variant),
    }

    if let Some(modal) = &app.modal {
        draw_form_overlay(frame, &modal.form);
    }
    if let Some(confirm) = &app.confirm {
        draw_confirm_overlay(frame, &confirm.prompt);
    }
}

// ---------------------------------------------------------------------------
// Auth screens
// ---------------------------------------------------------------------------

fn login_hint() -> Line<'static> {
    Line::from(vec![
        Span::styled("Enter", Style::default().fg(ACCENT)),
        Span::raw(" sign in   "),
        Span::styled("F2", Style::default().fg(ACCENT)),
        Span::raw(" register   "),
        Span::styled("Esc", Style::default().fg(ACCENT)),
        Span::raw(" quit"),
    ])
}

fn register_hint(app: &App) -> Line<'static> {
    let mode = if app.register_as_admin {
        Span::styled("admin account", Style::default().fg(DANGER))
    } else {
        Span::raw("student account")
    };
    Line::from(vec![
        Span::styled("Enter", Style::default().fg(ACCENT)),
        Span::raw(" submit   "),
        Span::styled("F2", Style::default().fg(ACCENT)),
        Span::raw(" toggle: "),
        mode,
        Span::raw("   "),
        Span::styled("Esc", Style::default().fg(ACCENT)),
        Span::raw(" back"),
    ])
}

fn draw_auth(frame: &mut Frame, app: &App, form: &Form, hint: Line<'_>) {
    let area = centered_rect(frame.area(), 50, (form.fields.len() as u16) * 3 + 6);
    let block = Block::default()
        .title(format!(" {} ", form.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let mut constraints: Vec<Constraint> =
        form.fields.iter().map(|_| Constraint::Length(3)).collect();
    constraints.push(Constraint::Length(1)); // flash
    constraints.push(Constraint::Length(1)); // hint
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (i, field) in form.fields.iter().enumerate() {
        draw_field(frame, rows[i], field, i == form.focus);
    }

    let flash_area = rows[form.fields.len()];
    if let Some(flash) = &app.flash {
        let style = if flash.starts_with("Registration successful") || flash == "Logged out" {
            Style::default().fg(Color::Green)
        } else {
            Style::default().fg(DANGER)
        };
        frame.render_widget(
            Paragraph::new(flash.as_str())
                .style(style)
                .alignment(Alignment::Center),
            flash_area,
        );
    }
    frame.render_widget(
        Paragraph::new(hint).alignment(Alignment::Center),
        rows[form.fields.len() + 1],
    );
}

fn draw_field(frame: &mut Frame, area: Rect, field: &crate::form::Field, focused: bool) {
    let border = if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(MUTED)
    };
    let shown = if field.mask {
        "\u{2022}".repeat(field.value.chars().count())
    } else {
        field.value.clone()
    };
    frame.render_widget(
        Paragraph::new(shown).block(
            Block::default()
                .title(field.label)
                .borders(Borders::ALL)
                .border_style(border),
        ),
        area,
    );
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

fn draw_dashboard(frame: &mut Frame, app: &App, variant: DashboardVariant) {
    let Some(user) = app.session.user() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // menu
            Constraint::Min(3),    // body
            Constraint::Length(1), // status
        ])
        .split(frame.area());

    let entries = visible_menu(user);
    let current = app.current_view();
    let selected = entries.iter().position(|e| e.view == current).unwrap_or(0);
    let titles: Vec<Line> = entries.iter().map(|e| Line::from(e.label)).collect();
    frame.render_widget(
        Tabs::new(titles)
            .select(selected)
            .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} \u{2014} {} ", user.username, user.role)),
            ),
        chunks[0],
    );

    match variant {
        DashboardVariant::Admin => draw_admin_body(frame, app, chunks[1]),
        DashboardVariant::Teacher => draw_teacher_body(frame, app, user, chunks[1]),
        DashboardVariant::Student => draw_student_body(frame, app, chunks[1]),
    }

    draw_status_line(frame, app, variant, chunks[2]);
}

fn draw_status_line(frame: &mut Frame, app: &App, variant: DashboardVariant, area: Rect) {
    let (loading, error) = match variant {
        DashboardVariant::Admin => (app.admin.loading, app.admin.error.as_deref()),
        DashboardVariant::Teacher => (app.teacher.loading, app.teacher.error.as_deref()),
        DashboardVariant::Student => (app.student.loading, app.student.error.as_deref()),
    };

    let line = if let Some(error) = error {
        Line::styled(error.to_string(), Style::default().fg(DANGER))
    } else if loading {
        Line::styled("Loading...", Style::default().fg(MUTED))
    } else {
        let mut spans = vec![hotkey("Tab"), Span::raw(" view  "), hotkey("r"), Span::raw(" reload  ")];
        if variant == DashboardVariant::Admin {
            spans.extend([
                hotkey("n"),
                Span::raw(" new  "),
                hotkey("e"),
                Span::raw(" edit  "),
                hotkey("d"),
                Span::raw(" delete  "),
                hotkey("i"),
                Span::raw("/"),
                hotkey("k"),
                Span::raw(" invite/kick  "),
            ]);
        }
        if variant == DashboardVariant::Student {
            spans.extend([hotkey("Enter"), Span::raw(" enroll/drop  ")]);
        }
        spans.extend([
            hotkey("Esc"),
            Span::raw(" sign out  "),
            hotkey("q"),
            Span::raw(" quit"),
        ]);
        Line::from(spans)
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn hotkey(label: &str) -> Span<'_> {
    Span::styled(label, Style::default().fg(ACCENT))
}

// ---------------------------------------------------------------------------
// Bodies per role
// ---------------------------------------------------------------------------

fn draw_admin_body(frame: &mut Frame, app: &App, area: Rect) {
    match app.admin.view() {
        ViewKey::Overview => {
            let lines = vec![
                Line::from("Administration"),
                Line::from(""),
                Line::from(format!("{} teachers on record", app.admin.teachers.len())),
                Line::from("Pick a tab to manage users, courses and departments."),
            ];
            frame.render_widget(
                Paragraph::new(lines).block(titled_block("Overview")),
                area,
            );
        }
        ViewKey::Users => draw_user_table(frame, area, "Users", &app.admin.users, app.row),
        ViewKey::Students => {
            draw_user_table(frame, area, "Students", &app.admin.students, app.row)
        }
        ViewKey::Teachers => {
            draw_user_table(frame, area, "Teachers", &app.admin.teachers, app.row)
        }
        ViewKey::Departments => {
            let rows: Vec<Row> = app
                .admin
                .departments
                .iter()
                .map(|d| Row::new(vec![d.id.to_string(), d.name.clone()]))
                .collect();
            draw_table(
                frame,
                area,
                "Departments",
                &["Id", "Name"],
                &[Constraint::Length(6), Constraint::Min(10)],
                rows,
                app.row,
            );
        }
        ViewKey::Courses => {
            let rows: Vec<Row> = app
                .admin
                .courses
                .iter()
                .map(|c| {
                    Row::new(vec![
                        c.course_nr.clone(),
                        c.course.clone(),
                        app.admin.teacher_name(c.teacher_id).to_string(),
                        c.cr_cost.to_string(),
                        c.timeslots.clone(),
                    ])
                })
                .collect();
            draw_table(
                frame,
                area,
                "Courses",
                &["Number", "Name", "Teacher", "Credits", "Timeslots"],
                &[
                    Constraint::Length(10),
                    Constraint::Min(16),
                    Constraint::Length(14),
                    Constraint::Length(8),
                    Constraint::Min(10),
                ],
                rows,
                app.row,
            );
        }
        ViewKey::Stats => draw_stats(frame, app, area),
    }
}

fn draw_stats(frame: &mut Frame, app: &App, area: Rect) {
    let lines = match &app.admin.stats {
        Some(s) => vec![
            Line::from(format!("Registered users    {}", s.registered_users)),
            Line::from(format!("Suspended users     {}", s.suspended_users)),
            Line::from(format!("Faculty members     {}", s.faculty_members)),
            Line::from(format!("Active students     {}", s.active_students)),
            Line::from(format!("Graduated students  {}", s.graduated_students)),
            Line::from(format!("Courses             {}", s.courses)),
            Line::from(format!("Departments         {}", s.departments)),
        ],
        None => vec![Line::from("No statistics loaded yet.")],
    };
    frame.render_widget(
        Paragraph::new(lines).block(titled_block("Statistics")),
        area,
    );
}

fn draw_teacher_body(frame: &mut Frame, app: &App, user: &User, area: Rect) {
    match app.teacher.view() {
        ViewKey::Courses => {
            let rows: Vec<Row> = app
                .teacher
                .courses
                .iter()
                .map(|c| {
                    let mine = c.teacher_id == user.id;
                    let style = if mine {
                        Style::default().fg(ACCENT)
                    } else {
                        Style::default()
                    };
                    Row::new(vec![
                        Cell::from(c.course_nr.clone()),
                        Cell::from(c.course.clone()),
                        Cell::from(if mine { "yours" } else { "" }),
                        Cell::from(c.timeslots.clone()),
                    ])
                    .style(style)
                })
                .collect();
            draw_table(
                frame,
                area,
                "Courses",
                &["Number", "Name", "", "Timeslots"],
                &[
                    Constraint::Length(10),
                    Constraint::Min(16),
                    Constraint::Length(7),
                    Constraint::Min(10),
                ],
                rows,
                app.row,
            );
        }
        _ => {
            let own = app.teacher.own_courses(user.id).count();
            let lines = vec![
                Line::from(format!("Welcome back, {}.", user.username)),
                Line::from(""),
                Line::from(format!("You are teaching {} course(s).", own)),
                Line::from("Open the Courses tab for the full catalogue."),
            ];
            frame.render_widget(
                Paragraph::new(lines).block(titled_block("Overview")),
                area,
            );
        }
    }
}

fn draw_student_body(frame: &mut Frame, app: &App, area: Rect) {
    match app.student.view() {
        ViewKey::Courses => {
            let rows: Vec<Row> = app
                .student
                .courses
                .iter()
                .map(|c: &Course| {
                    let enrolled = app.student.is_enrolled(c.id);
                    let style = if enrolled {
                        Style::default().fg(Color::Green)
                    } else {
                        Style::default()
                    };
                    Row::new(vec![
                        Cell::from(c.course_nr.clone()),
                        Cell::from(c.course.clone()),
                        Cell::from(c.cr_cost.to_string()),
                        Cell::from(if enrolled { "enrolled" } else { "" }),
                        Cell::from(c.timeslots.clone()),
                    ])
                    .style(style)
                })
                .collect();
            let title = format!(
                "Courses ({} enrolled, {} credits)",
                app.student.enrolled_count(),
                app.student.enrolled_credits()
            );
            draw_table(
                frame,
                area,
                &title,
                &["Number", "Name", "Credits", "", "Timeslots"],
                &[
                    Constraint::Length(10),
                    Constraint::Min(16),
                    Constraint::Length(8),
                    Constraint::Length(9),
                    Constraint::Min(10),
                ],
                rows,
                app.row,
            );
        }
        _ => {
            let lines = vec![
                Line::from("Student dashboard"),
                Line::from(""),
                Line::from(format!(
                    "Enrolled in {} course(s) for {} credits.",
                    app.student.enrolled_count(),
                    app.student.enrolled_credits()
                )),
                Line::from("Open the Courses tab to enroll or drop."),
            ];
            frame.render_widget(
                Paragraph::new(lines).block(titled_block("Overview")),
                area,
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Table helpers
// ---------------------------------------------------------------------------

fn draw_user_table(frame: &mut Frame, area: Rect, title: &str, users: &[User], row: usize) {
    let rows: Vec<Row> = users
        .iter()
        .map(|u| {
            Row::new(vec![
                u.id.to_string(),
                u.username.clone(),
                u.email.clone(),
                u.role.to_string(),
                if u.suspended {
                    "suspended".to_string()
                } else if u.verified {
                    "verified".to_string()
                } else {
                    "pending".to_string()
                },
            ])
        })
        .collect();
    draw_table(
        frame,
        area,
        title,
        &["Id", "Username", "Email", "Role", "Status"],
        &[
            Constraint::Length(6),
            Constraint::Length(16),
            Constraint::Min(20),
            Constraint::Length(9),
            Constraint::Length(10),
        ],
        rows,
        row,
    );
}

fn draw_table(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    header: &[&'static str],
    widths: &[Constraint],
    rows: Vec<Row>,
    selected: usize,
) {
    let empty = rows.is_empty();
    let rows: Vec<Row> = rows
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            if i == selected {
                r.style(Style::default().add_modifier(Modifier::REVERSED))
            } else {
                r
            }
        })
        .collect();

    let table = Table::new(rows, widths.to_vec())
        .header(Row::new(header.to_vec()).style(Style::default().add_modifier(Modifier::BOLD)))
        .block(titled_block(title));
    frame.render_widget(table, area);

    if empty {
        let inner = Rect {
            x: area.x + 2,
            y: area.y + 2,
            width: area.width.saturating_sub(4),
            height: 1,
        };
        frame.render_widget(
            Paragraph::new("Nothing here yet.").style(Style::default().fg(MUTED)),
            inner,
        );
    }
}

fn titled_block(title: &str) -> Block<'_> {
    Block::default()
        .title(format!(" {} ", title))
        .borders(Borders::ALL)
}

// ---------------------------------------------------------------------------
// Overlays
// ---------------------------------------------------------------------------

fn draw_form_overlay(frame: &mut Frame, form: &Form) {
    let area = centered_rect(frame.area(), 56, (form.fields.len() as u16) * 3 + 3);
    let block = Block::default()
        .title(format!(" {} (Enter save, Esc cancel) ", form.title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT));
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let constraints: Vec<Constraint> =
        form.fields.iter().map(|_| Constraint::Length(3)).collect();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);
    for (i, field) in form.fields.iter().enumerate() {
        draw_field(frame, rows[i], field, i == form.focus);
    }
}

fn draw_confirm_overlay(frame: &mut Frame, prompt: &str) {
    let area = centered_rect(frame.area(), (prompt.len() as u16 + 6).max(30), 3);
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(prompt).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(DANGER)),
        ),
        area,
    );
}

fn draw_centered_notice(frame: &mut Frame, text: &str) {
    let area = centered_rect(frame.area(), (text.len() as u16 + 6).max(30), 3);
    frame.render_widget(
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL)),
        area,
    );
}

fn centered_rect(outer: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(outer.width);
    let height = height.min(outer.height);
    Rect {
        x: outer.x + (outer.width - width) / 2,
        y: outer.y + (outer.height - height) / 2,
        width,
        height,
    }
}
