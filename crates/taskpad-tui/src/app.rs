use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use taskpad_api::{BlockingClient, Dispatch, Level, Notice, SessionStore};
use taskpad_core::route::Route;
use taskpad_core::task::{CreateTask, Task, UpdateTask};
use taskpad_core::validate::{
    validate_login, validate_signup, validate_task, FormErrors, LoginForm, SignupForm, TaskForm,
};

use crate::components::task_list::TaskList;

/// Which login field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginField {
    Email,
    Password,
}

/// Which signup field has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignupField {
    Name,
    Email,
    Password,
}

/// Whether the task editor creates a new task or rewrites an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Editor {
    Add,
    Update { task_id: String },
}

/// What the app is currently doing.
#[derive(Debug, Clone)]
pub enum Mode {
    /// The task list, or a welcome screen when logged out.
    Home,
    Login {
        form: LoginForm,
        errors: FormErrors,
        focus: LoginField,
    },
    Signup {
        form: SignupForm,
        errors: FormErrors,
        focus: SignupField,
    },
    TaskEditor {
        editor: Editor,
        form: TaskForm,
        errors: FormErrors,
        /// The server's copy, kept so Reset can restore it in update mode.
        fetched: Option<Task>,
    },
    ConfirmDelete { task: Task },
}

pub struct App {
    api: BlockingClient,
    session: SessionStore,
    dispatch: Dispatch,
    mode: Mode,
    tasks: TaskList,
}

impl App {
    /// Restore any persisted session, then load the task list if that
    /// left us logged in.
    pub fn new(mut api: BlockingClient, mut session: SessionStore) -> Self {
        session.restore(&mut api);
        let mut app = Self {
            api,
            session,
            dispatch: Dispatch::new(),
            mode: Mode::Home,
            tasks: TaskList::new(),
        };
        app.refresh();
        app
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.dispatch.notice()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// The window title: the user's list when logged in, the app name
    /// otherwise.
    pub fn title(&self) -> String {
        match self.session.user_name() {
            Some(name) => format!("{name}'s Tasks"),
            None => "Task Manager".to_string(),
        }
    }

    /// The client location for the current screen. The delete dialog is
    /// an overlay over the list, not a location of its own.
    pub fn route(&self) -> Route {
        match &self.mode {
            Mode::Home | Mode::ConfirmDelete { .. } => Route::Home,
            Mode::Login { .. } => Route::Login,
            Mode::Signup { .. } => Route::Signup,
            Mode::TaskEditor {
                editor: Editor::Add,
                ..
            } => Route::AddTask,
            Mode::TaskEditor {
                editor: Editor::Update { task_id },
                ..
            } => Route::EditTask {
                id: task_id.clone(),
            },
        }
    }

    pub fn is_input_mode(&self) -> bool {
        matches!(
            self.mode,
            Mode::Login { .. } | Mode::Signup { .. } | Mode::TaskEditor { .. }
        )
    }

    /// Re-fetch the task list. Quietly does nothing when logged out.
    pub fn refresh(&mut self) {
        if !self.session.is_logged_in() {
            return;
        }
        let Self { api, dispatch, .. } = self;
        match dispatch.run(None, || api.list_tasks()) {
            Ok(tasks) => self.tasks.set_tasks(tasks),
            Err(e) if e.is_unauthorized() => self.force_login(),
            Err(_) => {}
        }
    }

    /// The server rejected our token on a protected call: drop the
    /// session and put the user in front of the login form.
    fn force_login(&mut self) {
        let Self { api, session, .. } = self;
        session.invalidate(api);
        self.tasks.clear();
        self.mode = Mode::Login {
            form: LoginForm::default(),
            errors: FormErrors::default(),
            focus: LoginField::Email,
        };
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.dispatch.clear_notice();

        match self.mode.clone() {
            Mode::Home => self.handle_home(key),
            Mode::Login { form, errors, focus } => self.handle_login(key, form, errors, focus),
            Mode::Signup { form, errors, focus } => self.handle_signup(key, form, errors, focus),
            Mode::TaskEditor {
                editor,
                form,
                errors,
                fetched,
            } => self.handle_task_editor(key, editor, form, errors, fetched),
            Mode::ConfirmDelete { task } => self.handle_confirm_delete(key, task),
        }
    }

    fn handle_home(&mut self, key: KeyEvent) {
        if !self.session.is_logged_in() {
            match key.code {
                KeyCode::Char('l') => {
                    self.mode = Mode::Login {
                        form: LoginForm::default(),
                        errors: FormErrors::default(),
                        focus: LoginField::Email,
                    };
                }
                KeyCode::Char('s') => {
                    self.mode = Mode::Signup {
                        form: SignupForm::default(),
                        errors: FormErrors::default(),
                        focus: SignupField::Name,
                    };
                }
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.tasks.next(),
            KeyCode::Char('k') | KeyCode::Up => self.tasks.previous(),
            KeyCode::Char('g') => self.tasks.first(),
            KeyCode::Char('G') => self.tasks.last(),
            KeyCode::Char('a') => {
                self.mode = Mode::TaskEditor {
                    editor: Editor::Add,
                    form: TaskForm::default(),
                    errors: FormErrors::default(),
                    fetched: None,
                };
            }
            KeyCode::Enter => {
                if let Some(task) = self.tasks.selected_task() {
                    let id = task.id.clone();
                    self.fetch_and_edit(id);
                }
            }
            KeyCode::Char('d') => {
                if let Some(task) = self.tasks.selected_task() {
                    self.mode = Mode::ConfirmDelete { task: task.clone() };
                }
            }
            KeyCode::Char('r') => self.refresh(),
            KeyCode::Char('l') => {
                let Self { api, session, .. } = self;
                session.logout(api);
                self.tasks.clear();
            }
            _ => {}
        }
    }

    /// Fetch the current server copy of a task, then open the editor
    /// prefilled with it.
    fn fetch_and_edit(&mut self, id: String) {
        let Self { api, dispatch, .. } = self;
        match dispatch.run(None, || api.get_task(&id)) {
            Ok(task) => {
                self.mode = Mode::TaskEditor {
                    editor: Editor::Update {
                        task_id: task.id.clone(),
                    },
                    form: TaskForm {
                        description: task.description.clone(),
                    },
                    errors: FormErrors::default(),
                    fetched: Some(task),
                };
            }
            Err(e) if e.is_unauthorized() => self.force_login(),
            Err(_) => {}
        }
    }

    fn handle_login(
        &mut self,
        key: KeyEvent,
        mut form: LoginForm,
        errors: FormErrors,
        focus: LoginField,
    ) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Home;
                return;
            }
            KeyCode::Tab | KeyCode::Down => {
                let focus = match focus {
                    LoginField::Email => LoginField::Password,
                    LoginField::Password => LoginField::Email,
                };
                self.mode = Mode::Login { form, errors, focus };
                return;
            }
            KeyCode::BackTab | KeyCode::Up => {
                let focus = match focus {
                    LoginField::Email => LoginField::Password,
                    LoginField::Password => LoginField::Email,
                };
                self.mode = Mode::Login { form, errors, focus };
                return;
            }
            KeyCode::Enter => {
                self.submit_login(form, focus);
                return;
            }
            KeyCode::Char(c) => match focus {
                LoginField::Email => form.email.push(c),
                LoginField::Password => form.password.push(c),
            },
            KeyCode::Backspace => {
                match focus {
                    LoginField::Email => form.email.pop(),
                    LoginField::Password => form.password.pop(),
                };
            }
            _ => {}
        }
        self.mode = Mode::Login { form, errors, focus };
    }

    /// Validate, and only talk to the server when every field passes.
    fn submit_login(&mut self, form: LoginForm, focus: LoginField) {
        let errors = validate_login(&form);
        if !errors.is_empty() {
            self.mode = Mode::Login { form, errors, focus };
            return;
        }

        let Self {
            api,
            session,
            dispatch,
            ..
        } = self;
        let result = dispatch.run(Some("Login successful"), || {
            session.login(api, &form.email, &form.password)
        });
        match result {
            Ok(()) => {
                self.mode = Mode::Home;
                self.refresh();
            }
            Err(_) => {
                self.mode = Mode::Login {
                    form,
                    errors: FormErrors::default(),
                    focus,
                };
            }
        }
    }

    fn handle_signup(
        &mut self,
        key: KeyEvent,
        mut form: SignupForm,
        errors: FormErrors,
        focus: SignupField,
    ) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Home;
                return;
            }
            KeyCode::Tab | KeyCode::Down => {
                let focus = match focus {
                    SignupField::Name => SignupField::Email,
                    SignupField::Email => SignupField::Password,
                    SignupField::Password => SignupField::Name,
                };
                self.mode = Mode::Signup { form, errors, focus };
                return;
            }
            KeyCode::BackTab | KeyCode::Up => {
                let focus = match focus {
                    SignupField::Name => SignupField::Password,
                    SignupField::Email => SignupField::Name,
                    SignupField::Password => SignupField::Email,
                };
                self.mode = Mode::Signup { form, errors, focus };
                return;
            }
            KeyCode::Enter => {
                self.submit_signup(form, focus);
                return;
            }
            KeyCode::Char(c) => match focus {
                SignupField::Name => form.name.push(c),
                SignupField::Email => form.email.push(c),
                SignupField::Password => form.password.push(c),
            },
            KeyCode::Backspace => {
                match focus {
                    SignupField::Name => form.name.pop(),
                    SignupField::Email => form.email.pop(),
                    SignupField::Password => form.password.pop(),
                };
            }
            _ => {}
        }
        self.mode = Mode::Signup { form, errors, focus };
    }

    /// On success, hand off to the login form with the email prefilled.
    fn submit_signup(&mut self, form: SignupForm, focus: SignupField) {
        let errors = validate_signup(&form);
        if !errors.is_empty() {
            self.mode = Mode::Signup { form, errors, focus };
            return;
        }

        let Self { api, dispatch, .. } = self;
        let result = dispatch.run(Some("Account created, please log in"), || {
            api.signup(&form.name, &form.email, &form.password)
        });
        match result {
            Ok(_) => {
                self.mode = Mode::Login {
                    form: LoginForm {
                        email: form.email.clone(),
                        password: String::new(),
                    },
                    errors: FormErrors::default(),
                    focus: LoginField::Password,
                };
            }
            Err(_) => {
                self.mode = Mode::Signup { form, errors, focus };
            }
        }
    }

    fn handle_task_editor(
        &mut self,
        key: KeyEvent,
        editor: Editor,
        mut form: TaskForm,
        errors: FormErrors,
        fetched: Option<Task>,
    ) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Home;
                return;
            }
            KeyCode::Char('s') if ctrl => {
                self.submit_task(editor, form, fetched);
                return;
            }
            KeyCode::Char('r') if ctrl => {
                // Reset: back to the fetched copy in update mode, blank
                // in add mode.
                form.description = fetched
                    .as_ref()
                    .map(|t| t.description.clone())
                    .unwrap_or_default();
                self.mode = Mode::TaskEditor {
                    editor,
                    form,
                    errors: FormErrors::default(),
                    fetched,
                };
                return;
            }
            KeyCode::Enter => form.description.push('\n'),
            KeyCode::Char(c) => form.description.push(c),
            KeyCode::Backspace => {
                form.description.pop();
            }
            _ => {}
        }
        self.mode = Mode::TaskEditor {
            editor,
            form,
            errors,
            fetched,
        };
    }

    fn submit_task(&mut self, editor: Editor, form: TaskForm, fetched: Option<Task>) {
        let errors = validate_task(&form);
        if !errors.is_empty() {
            self.mode = Mode::TaskEditor {
                editor,
                form,
                errors,
                fetched,
            };
            return;
        }

        let Self { api, dispatch, .. } = self;
        let result = match &editor {
            Editor::Add => dispatch.run(Some("Task created successfully"), || {
                api.create_task(&CreateTask {
                    description: form.description.clone(),
                })
            }),
            Editor::Update { task_id } => dispatch.run(Some("Task updated successfully"), || {
                api.update_task(
                    task_id,
                    &UpdateTask {
                        description: form.description.clone(),
                    },
                )
            }),
        };

        match result {
            Ok(_) => {
                self.mode = Mode::Home;
                self.refresh();
            }
            Err(e) if e.is_unauthorized() => self.force_login(),
            Err(_) => {
                self.mode = Mode::TaskEditor {
                    editor,
                    form,
                    errors: FormErrors::default(),
                    fetched,
                };
            }
        }
    }

    /// Delete on confirm, then re-fetch the list so the view reflects the
    /// server.
    fn handle_confirm_delete(&mut self, key: KeyEvent, task: Task) {
        self.mode = Mode::Home;
        if key.code != KeyCode::Char('y') {
            return;
        }

        let Self { api, dispatch, .. } = self;
        let result = dispatch.run(Some("Task deleted successfully"), || {
            api.delete_task(&task.id)
        });
        match result {
            Ok(()) => self.refresh(),
            Err(e) if e.is_unauthorized() => self.force_login(),
            Err(_) => {}
        }
    }

    // ---- Rendering ----

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        self.render_title_bar(frame, layout[0]);
        self.render_home(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        // Overlays
        match &self.mode {
            Mode::Home => {}
            Mode::Login { form, errors, focus } => {
                self.render_login(frame, form, errors, *focus, area)
            }
            Mode::Signup { form, errors, focus } => {
                self.render_signup(frame, form, errors, *focus, area)
            }
            Mode::TaskEditor {
                editor,
                form,
                errors,
                ..
            } => self.render_task_editor(frame, editor, form, errors, area),
            Mode::ConfirmDelete { task } => self.render_confirm_delete(frame, task, area),
        }
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![
            Span::styled(" taskpad ", Style::default().bold().fg(Color::Cyan)),
            Span::raw("| "),
            Span::styled(self.title(), Style::default().fg(Color::Yellow)),
            Span::styled(
                format!("  {}", self.route()),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if self.dispatch.loading() {
            spans.push(Span::styled(
                " (loading)",
                Style::default().fg(Color::DarkGray),
            ));
        }
        frame.render_widget(Line::from(spans), area);
    }

    fn render_home(&self, frame: &mut Frame, area: Rect) {
        if self.session.is_logged_in() {
            self.tasks.render(frame, area);
            return;
        }

        let text = "Welcome to Task Manager\n\n\
            Keep track of what needs doing.\n\n\
            Press 'l' to log in or 's' to sign up.";
        let welcome = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: false })
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(welcome, area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(notice) = self.dispatch.notice() {
            let color = match notice.level {
                Level::Success => Color::Green,
                Level::Error => Color::Red,
            };
            let line = Line::from(Span::styled(
                format!(" {}", notice.text),
                Style::default().fg(color),
            ));
            frame.render_widget(line, area);
            return;
        }

        let hints: Vec<(&str, &str)> = match &self.mode {
            Mode::Home if self.session.is_logged_in() => vec![
                ("j/k", "nav"),
                ("a", "add"),
                ("Enter", "edit"),
                ("d", "del"),
                ("r", "refresh"),
                ("l", "logout"),
                ("q", "quit"),
            ],
            Mode::Home => vec![("l", "login"), ("s", "signup"), ("q", "quit")],
            Mode::Login { .. } | Mode::Signup { .. } => {
                vec![("Tab", "next field"), ("Enter", "submit"), ("Esc", "back")]
            }
            Mode::TaskEditor { .. } => vec![
                ("Ctrl+S", "save"),
                ("Ctrl+R", "reset"),
                ("Enter", "newline"),
                ("Esc", "cancel"),
            ],
            Mode::ConfirmDelete { .. } => vec![("y", "confirm"), ("any", "cancel")],
        };

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(format!(" {key}"), Style::default().fg(Color::Yellow).bold()),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();
        frame.render_widget(Line::from(spans), area);
    }

    fn render_login(
        &self,
        frame: &mut Frame,
        form: &LoginForm,
        errors: &FormErrors,
        focus: LoginField,
        area: Rect,
    ) {
        let popup = centered_rect(50, 40, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Log In ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let mut lines = Vec::new();
        push_field(
            &mut lines,
            "Email",
            &form.email,
            focus == LoginField::Email,
            errors.error_for("email"),
        );
        push_field(
            &mut lines,
            "Password",
            &mask(&form.password),
            focus == LoginField::Password,
            errors.error_for("password"),
        );

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup);
    }

    fn render_signup(
        &self,
        frame: &mut Frame,
        form: &SignupForm,
        errors: &FormErrors,
        focus: SignupField,
        area: Rect,
    ) {
        let popup = centered_rect(50, 50, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Sign Up ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let mut lines = Vec::new();
        push_field(
            &mut lines,
            "Name",
            &form.name,
            focus == SignupField::Name,
            errors.error_for("name"),
        );
        push_field(
            &mut lines,
            "Email",
            &form.email,
            focus == SignupField::Email,
            errors.error_for("email"),
        );
        push_field(
            &mut lines,
            "Password",
            &mask(&form.password),
            focus == SignupField::Password,
            errors.error_for("password"),
        );

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup);
    }

    fn render_task_editor(
        &self,
        frame: &mut Frame,
        editor: &Editor,
        form: &TaskForm,
        errors: &FormErrors,
        area: Rect,
    ) {
        let popup = centered_rect(60, 60, area);
        frame.render_widget(Clear, popup);

        let title = match editor {
            Editor::Add => " Add Task ",
            Editor::Update { .. } => " Edit Task ",
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let mut lines = Vec::new();
        if let Some(err) = errors.error_for("description") {
            lines.push(Line::from(Span::styled(
                err.to_string(),
                Style::default().fg(Color::Red),
            )));
            lines.push(Line::from(""));
        }
        for text_line in form.description.split('\n') {
            lines.push(Line::from(text_line.to_string()));
        }

        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup);
    }

    fn render_confirm_delete(&self, frame: &mut Frame, task: &Task, area: Rect) {
        let popup = centered_rect(50, 20, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Confirm Delete ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));

        let summary = task.description.lines().next().unwrap_or("");
        let text = format!("Delete \"{summary}\"?\n\n(y)es / (any key) cancel");
        let paragraph = Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, popup);
    }
}

/// One labeled form field with its value and, when present, its inline
/// validation error.
fn push_field(
    lines: &mut Vec<Line<'static>>,
    label: &str,
    value: &str,
    focused: bool,
    error: Option<&str>,
) {
    let label_style = if focused {
        Style::default().fg(Color::Cyan).bold()
    } else {
        Style::default().bold()
    };
    let cursor = if focused { "_" } else { "" };
    lines.push(Line::from(vec![
        Span::styled(format!("{label}: "), label_style),
        Span::raw(format!("{value}{cursor}")),
    ]));
    if let Some(err) = error {
        lines.push(Line::from(Span::styled(
            format!("  {err}"),
            Style::default().fg(Color::Red),
        )));
    }
    lines.push(Line::from(""));
}

fn mask(value: &str) -> String {
    "*".repeat(value.chars().count())
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
