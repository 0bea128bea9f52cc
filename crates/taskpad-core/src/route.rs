use std::fmt;

/// Client-side routes, one per screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    AddTask,
    EditTask { id: String },
}

impl Route {
    pub fn parse(path: &str) -> Option<Route> {
        match path {
            "/" => Some(Route::Home),
            "/login" => Some(Route::Login),
            "/signup" => Some(Route::Signup),
            "/tasks/add" => Some(Route::AddTask),
            _ => {
                let id = path.strip_prefix("/tasks/")?;
                if id.is_empty() || id.contains('/') {
                    return None;
                }
                Some(Route::EditTask { id: id.to_string() })
            }
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".into(),
            Route::Login => "/login".into(),
            Route::Signup => "/signup".into(),
            Route::AddTask => "/tasks/add".into(),
            Route::EditTask { id } => format!("/tasks/{id}"),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_paths() {
        assert_eq!(Route::parse("/"), Some(Route::Home));
        assert_eq!(Route::parse("/login"), Some(Route::Login));
        assert_eq!(Route::parse("/signup"), Some(Route::Signup));
        assert_eq!(Route::parse("/tasks/add"), Some(Route::AddTask));
        assert_eq!(
            Route::parse("/tasks/42"),
            Some(Route::EditTask { id: "42".into() })
        );
    }

    #[test]
    fn parse_rejects_unknown_paths() {
        assert_eq!(Route::parse("/tasks/"), None);
        assert_eq!(Route::parse("/tasks/7/edit"), None);
        assert_eq!(Route::parse("/nope"), None);
        assert_eq!(Route::parse(""), None);
    }

    #[test]
    fn path_round_trips() {
        for path in ["/", "/login", "/signup", "/tasks/add", "/tasks/7"] {
            assert_eq!(Route::parse(path).unwrap().path(), path);
        }
    }
}
