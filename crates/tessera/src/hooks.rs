//! Pre- and post-hooks around every pipeline stage.
//!
//! Each stage of [`DiagramBuilder`](crate::DiagramBuilder) has a
//! [`StageHooks`] pair: the pre-hook rewrites the stage input before the
//! stage runs and the post-hook rewrites its output. Hooks are plain
//! synchronous closures.
//!
//! ```
//! # use tessera::hooks::StageHooks;
//! let hooks: StageHooks<String, usize> = StageHooks::default()
//!     .with_pre(|src: String| src.to_uppercase())
//!     .with_post(|n: usize| n + 1);
//! assert_eq!(hooks.run("ab".to_string(), |s| s.len()), 3);
//! ```

use tessera_core::semantic::{Diagram, Link};
use tessera_parser::raw::RawDocument;

use crate::{lanes::RoadTable, layout::GeometryInput, layout::Layout, route::LinkRoute};

type Hook<T> = Box<dyn Fn(T) -> T>;

/// Optional input and output rewrites for one stage.
pub struct StageHooks<I, O> {
    pre: Option<Hook<I>>,
    post: Option<Hook<O>>,
}

impl<I, O> Default for StageHooks<I, O> {
    fn default() -> Self {
        Self {
            pre: None,
            post: None,
        }
    }
}

impl<I, O> StageHooks<I, O> {
    /// Sets the hook applied to the stage input.
    pub fn with_pre(mut self, hook: impl Fn(I) -> I + 'static) -> Self {
        self.pre = Some(Box::new(hook));
        self
    }

    /// Sets the hook applied to the stage output.
    pub fn with_post(mut self, hook: impl Fn(O) -> O + 'static) -> Self {
        self.post = Some(Box::new(hook));
        self
    }

    /// Applies the pre-hook, if any.
    pub fn pre(&self, input: I) -> I {
        match &self.pre {
            Some(hook) => hook(input),
            None => input,
        }
    }

    /// Applies the post-hook, if any.
    pub fn post(&self, output: O) -> O {
        match &self.post {
            Some(hook) => hook(output),
            None => output,
        }
    }

    /// Runs an infallible stage between both hooks.
    pub fn run(&self, input: I, stage: impl FnOnce(I) -> O) -> O {
        self.post(stage(self.pre(input)))
    }

    /// Runs a fallible stage between both hooks.
    pub fn try_run<E>(&self, input: I, stage: impl FnOnce(I) -> Result<O, E>) -> Result<O, E> {
        stage(self.pre(input)).map(|output| self.post(output))
    }
}

/// Hooks of every stage.
#[derive(Default)]
pub struct PipelineHooks {
    /// Source text to raw document.
    pub read: StageHooks<String, RawDocument>,
    /// Raw document to resolved diagram.
    pub resolve: StageHooks<RawDocument, Diagram>,
    /// Links to routes.
    pub route: StageHooks<Vec<Link>, Vec<LinkRoute>>,
    /// Routes to the lane table.
    pub lanes: StageHooks<Vec<LinkRoute>, RoadTable>,
    /// Geometry input to the final layout.
    pub geometry: StageHooks<GeometryInput, Layout>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_hooks_pass_through() {
        let hooks: StageHooks<i32, i32> = StageHooks::default();
        assert_eq!(hooks.run(2, |n| n * 10), 20);
    }

    #[test]
    fn test_try_run_skips_post_on_error() {
        let hooks: StageHooks<i32, i32> = StageHooks::default()
            .with_pre(|n| n + 1)
            .with_post(|_| panic!("post hook must not run"));
        let result: Result<i32, &str> = hooks.try_run(1, |_| Err("failed"));
        assert_eq!(result, Err("failed"));
    }

    #[test]
    fn test_hook_order() {
        let hooks: StageHooks<Vec<u8>, Vec<u8>> = StageHooks::default()
            .with_pre(|mut v: Vec<u8>| {
                v.push(1);
                v
            })
            .with_post(|mut v: Vec<u8>| {
                v.push(3);
                v
            });
        let out = hooks.run(Vec::new(), |mut v| {
            v.push(2);
            v
        });
        assert_eq!(out, [1, 2, 3]);
    }
}
