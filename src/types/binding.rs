//! Form element bindings.
//!
//! An [`ElementRef`] is the descriptor a host uses to find a page element
//! again: tag name, id and class list. The core only checks presence.

use serde::{Deserialize, Serialize};

/// The role an element plays in the login form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingRole {
    Username,
    Password,
    Submit,
}

impl BindingRole {
    /// All roles, in precondition check order.
    pub const ALL: [BindingRole; 3] = [BindingRole::Username, BindingRole::Password, BindingRole::Submit];

    /// Returns the string representation of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            BindingRole::Username => "username",
            BindingRole::Password => "password",
            BindingRole::Submit => "submit",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "username" | "user" => Some(BindingRole::Username),
            "password" | "pass" => Some(BindingRole::Password),
            "submit" | "login" | "loginbutton" => Some(BindingRole::Submit),
            _ => None,
        }
    }
}

impl std::fmt::Display for BindingRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Descriptor of a selected page element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementRef {
    pub tag_name: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub class: String,
}

impl ElementRef {
    pub fn new(tag_name: impl Into<String>, id: impl Into<String>, class: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            id: id.into(),
            class: class.into(),
        }
    }
}

impl std::fmt::Display for ElementRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let id = if self.id.is_empty() { "No ID" } else { &self.id };
        let class = if self.class.is_empty() { "No Class" } else { &self.class };
        write!(
            f,
            "<{}> (ID: \"{}\", Class: \"{}\")",
            self.tag_name.to_lowercase(),
            id,
            class
        )
    }
}

/// The three elements a run needs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormBindings {
    pub username: Option<ElementRef>,
    pub password: Option<ElementRef>,
    pub submit: Option<ElementRef>,
}

impl FormBindings {
    /// Returns the binding for a role.
    pub fn get(&self, role: BindingRole) -> Option<&ElementRef> {
        match role {
            BindingRole::Username => self.username.as_ref(),
            BindingRole::Password => self.password.as_ref(),
            BindingRole::Submit => self.submit.as_ref(),
        }
    }

    /// Binds or clears the element for a role.
    pub fn set(&mut self, role: BindingRole, element: Option<ElementRef>) {
        match role {
            BindingRole::Username => self.username = element,
            BindingRole::Password => self.password = element,
            BindingRole::Submit => self.submit = element,
        }
    }

    /// Returns the roles that have no element bound.
    pub fn missing(&self) -> Vec<BindingRole> {
        BindingRole::ALL
            .into_iter()
            .filter(|role| self.get(*role).is_none())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}
