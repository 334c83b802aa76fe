//! Template types for typed variable injection.

use std::marker::PhantomData;

/// Trait for template variable sets
pub trait TemplateVars {
    fn apply(&self, content: &str) -> String;
}

/// Template with typed variable injection
#[derive(Debug, Clone, Copy)]
pub struct Template<V> {
    content: &'static str,
    _marker: PhantomData<V>,
}

impl<V> Template<V> {
    pub const fn new(content: &'static str) -> Self {
        Self {
            content,
            _marker: PhantomData,
        }
    }
}

impl<V: TemplateVars> Template<V> {
    pub fn render(&self, vars: &V) -> String {
        vars.apply(self.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Port(u16);

    impl TemplateVars for Port {
        fn apply(&self, content: &str) -> String {
            content.replace("__PORT__", &self.0.to_string())
        }
    }

    #[test]
    fn test_render_substitutes_vars() {
        const TPL: Template<Port> = Template::new("ws://localhost:__PORT__/");
        assert_eq!(TPL.render(&Port(35729)), "ws://localhost:35729/");
    }
}
