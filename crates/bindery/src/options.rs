/// Events that trigger an element → model write when the element does not
/// list its own.
pub const DEFAULT_EVENTS: &str = "change";

/// Attribute names and switches consulted by [`View::bind`](crate::View::bind).
///
/// ```rust
/// use bindery::BindingOptions;
///
/// let options = BindingOptions::default()
///     .prop_name_attr("data-bind")
///     .observe_model(false);
/// assert_eq!(options.events_attr, "data-bind-events");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingOptions {
    /// Attribute holding the property path an element is bound to.
    pub prop_name_attr: String,
    /// Attribute holding a space-separated list of trigger events.
    pub events_attr: String,
    /// Attribute naming a custom handler registered on the view.
    pub handler_attr: String,
    /// Push model changes back into the elements.
    pub observe_model: bool,
}

impl Default for BindingOptions {
    fn default() -> Self {
        Self {
            prop_name_attr: "name".to_string(),
            events_attr: "data-bind-events".to_string(),
            handler_attr: "data-bind-handler".to_string(),
            observe_model: true,
        }
    }
}

impl BindingOptions {
    pub fn prop_name_attr(mut self, attr: impl Into<String>) -> Self {
        self.prop_name_attr = attr.into();
        self
    }

    pub fn events_attr(mut self, attr: impl Into<String>) -> Self {
        self.events_attr = attr.into();
        self
    }

    pub fn handler_attr(mut self, attr: impl Into<String>) -> Self {
        self.handler_attr = attr.into();
        self
    }

    pub fn observe_model(mut self, observe: bool) -> Self {
        self.observe_model = observe;
        self
    }
}
