//! Per-request branch context.
//!
//! Repositories read [`BranchContext::branch`] to decide which branch an
//! operation targets. Workflows never switch the caller's context; each step
//! runs against a child from [`BranchContext::pinned`], so concurrent steps
//! sharing one request context cannot observe each other's branch.
//!
//! Code that owns a context can switch it temporarily with
//! [`BranchContext::enter`]. The scope borrows the context exclusively and
//! puts the previous branch back when dropped, whether the work succeeded,
//! failed, panicked or was cancelled.

use std::ops::{Deref, DerefMut};

use tracing::trace;

use super::types::Branch;

/// Ambient branch for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchContext {
    branch: Branch,
}

impl BranchContext {
    pub fn new(branch: Branch) -> Self {
        Self { branch }
    }

    /// Branch operations currently target.
    pub fn branch(&self) -> Branch {
        self.branch
    }

    /// A child context targeting `branch`; `self` is untouched.
    pub fn pinned(&self, branch: Branch) -> BranchContext {
        trace!(from = %self.branch, to = %branch, "branch context pinned");
        Self::new(branch)
    }

    /// Switch this context to `branch` until the returned scope is dropped.
    pub fn enter(&mut self, branch: Branch) -> BranchScope<'_> {
        let previous = std::mem::replace(&mut self.branch, branch);
        trace!(from = %previous, to = %branch, "branch context entered");
        BranchScope {
            context: self,
            previous,
        }
    }
}

impl Default for BranchContext {
    fn default() -> Self {
        Self::new(Branch::Master)
    }
}

/// Restores the previous branch on drop.
#[must_use = "the branch is restored as soon as the scope is dropped"]
#[derive(Debug)]
pub struct BranchScope<'a> {
    context: &'a mut BranchContext,
    previous: Branch,
}

impl Deref for BranchScope<'_> {
    type Target = BranchContext;

    fn deref(&self) -> &BranchContext {
        self.context
    }
}

impl DerefMut for BranchScope<'_> {
    fn deref_mut(&mut self) -> &mut BranchContext {
        self.context
    }
}

impl Drop for BranchScope<'_> {
    fn drop(&mut self) {
        self.context.branch = self.previous;
        trace!(to = %self.previous, "branch context restored");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn pinned_child_leaves_parent_alone() {
        let ctx = BranchContext::new(Branch::Master);
        let draft = ctx.pinned(Branch::Draft);
        assert_eq!(draft.branch(), Branch::Draft);
        assert_eq!(ctx.branch(), Branch::Master);
    }

    #[tokio::test]
    async fn overlapping_pinned_steps_stay_isolated() {
        let ctx = BranchContext::new(Branch::Master);

        let first = async {
            let draft = ctx.pinned(Branch::Draft);
            tokio::task::yield_now().await;
            draft.branch()
        };
        let second = async {
            let draft = ctx.pinned(Branch::Draft);
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            (draft.branch(), ctx.branch())
        };
        let (a, (b, parent_during)) = tokio::join!(first, second);

        assert_eq!(a, Branch::Draft);
        assert_eq!(b, Branch::Draft);
        assert_eq!(parent_during, Branch::Master);
        assert_eq!(ctx.branch(), Branch::Master);
    }

    #[test]
    fn enter_switches_and_restores() {
        let mut ctx = BranchContext::new(Branch::Master);
        {
            let scope = ctx.enter(Branch::Draft);
            assert_eq!(scope.branch(), Branch::Draft);
        }
        assert_eq!(ctx.branch(), Branch::Master);
    }

    #[tokio::test]
    async fn restores_when_dropped_mid_flight() {
        let mut ctx = BranchContext::new(Branch::Master);
        let outcome = tokio::time::timeout(Duration::from_millis(5), async {
            let _scope = ctx.enter(Branch::Draft);
            std::future::pending::<()>().await;
        })
        .await;
        assert!(outcome.is_err());
        assert_eq!(ctx.branch(), Branch::Master);
    }

    #[test]
    fn restores_after_panic() {
        let mut ctx = BranchContext::new(Branch::Master);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _scope = ctx.enter(Branch::Draft);
            panic!("editor blew up");
        }));
        assert!(result.is_err());
        assert_eq!(ctx.branch(), Branch::Master);
    }

    #[test]
    fn nested_scopes_unwind_in_order() {
        let mut ctx = BranchContext::new(Branch::Draft);
        {
            let mut outer = ctx.enter(Branch::Master);
            {
                let inner = outer.enter(Branch::Draft);
                assert_eq!(inner.branch(), Branch::Draft);
            }
            assert_eq!(outer.branch(), Branch::Master);
        }
        assert_eq!(ctx.branch(), Branch::Draft);
    }
}
