use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};
use taskpad_core::task::Task;

/// The scrollable task list shown on the home screen.
#[derive(Debug, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    state: ListState,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents, keeping the selection on the same task when it
    /// survived the refresh.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        let selected_id = self.selected_task().map(|t| t.id.clone());
        self.tasks = tasks;
        let position = selected_id.and_then(|id| self.tasks.iter().position(|t| t.id == id));
        match position {
            Some(pos) => self.state.select(Some(pos)),
            None if self.tasks.is_empty() => self.state.select(None),
            None => self.state.select(Some(0)),
        }
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
        self.state.select(None);
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.state.selected().and_then(|i| self.tasks.get(i))
    }

    pub fn next(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => (i + 1).min(self.tasks.len() - 1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let i = match self.state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.state.select(Some(i));
    }

    pub fn first(&mut self) {
        if !self.tasks.is_empty() {
            self.state.select(Some(0));
        }
    }

    pub fn last(&mut self) {
        if !self.tasks.is_empty() {
            self.state.select(Some(self.tasks.len() - 1));
        }
    }

    pub fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" My Tasks ({}) ", self.tasks.len()))
            .borders(Borders::ALL);

        if self.tasks.is_empty() {
            let empty = Paragraph::new("No tasks yet. Press 'a' to add one.")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        let items: Vec<ListItem> = self
            .tasks
            .iter()
            .enumerate()
            .map(|(i, task)| {
                let summary = task.description.lines().next().unwrap_or("");
                ListItem::new(Line::from(vec![
                    Span::styled(
                        format!("{:>3}. ", i + 1),
                        Style::default().fg(Color::DarkGray),
                    ),
                    Span::raw(summary.to_string()),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::Cyan).fg(Color::Black))
            .highlight_symbol("> ");

        let mut state = self.state.clone();
        frame.render_stateful_widget(list, area, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(id: &str, description: &str) -> Task {
        let now = Utc::now();
        Task {
            id: id.into(),
            description: description.into(),
            owner: "u1".into(),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn set_tasks_selects_the_first_row() {
        let mut list = TaskList::new();
        list.set_tasks(vec![task("1", "a"), task("2", "b")]);
        assert_eq!(list.selected_task().unwrap().id, "1");
    }

    #[test]
    fn selection_survives_a_refresh() {
        let mut list = TaskList::new();
        list.set_tasks(vec![task("1", "a"), task("2", "b"), task("3", "c")]);
        list.next();
        assert_eq!(list.selected_task().unwrap().id, "2");

        // Same rows in a different order.
        list.set_tasks(vec![task("3", "c"), task("2", "b"), task("1", "a")]);
        assert_eq!(list.selected_task().unwrap().id, "2");
    }

    #[test]
    fn selection_falls_back_when_the_row_is_gone() {
        let mut list = TaskList::new();
        list.set_tasks(vec![task("1", "a"), task("2", "b")]);
        list.next();
        list.set_tasks(vec![task("1", "a")]);
        assert_eq!(list.selected_task().unwrap().id, "1");

        list.set_tasks(vec![]);
        assert!(list.selected_task().is_none());
    }

    #[test]
    fn navigation_clamps_at_the_edges() {
        let mut list = TaskList::new();
        list.set_tasks(vec![task("1", "a"), task("2", "b")]);
        list.previous();
        assert_eq!(list.selected_task().unwrap().id, "1");
        list.next();
        list.next();
        list.next();
        assert_eq!(list.selected_task().unwrap().id, "2");
        list.first();
        assert_eq!(list.selected_task().unwrap().id, "1");
        list.last();
        assert_eq!(list.selected_task().unwrap().id, "2");
    }

    #[test]
    fn navigation_on_an_empty_list_is_a_no_op() {
        let mut list = TaskList::new();
        list.next();
        list.previous();
        list.first();
        list.last();
        assert!(list.selected_task().is_none());
    }
}
