//! Feed screen state
//!
//! Everything the feed screen shows lives in one [`ScreenState`], changed
//! only through its transition methods. Observers never see the state
//! itself: every transition made through [`SharedScreen::update`] publishes
//! an immutable [`ScreenView`] over a watch channel.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;

use crate::domain::entities::{FeedSnapshot, NewPost, PostId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn from_dark_mode(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

/// Lifecycle of the screen's feed subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncPhase {
    #[default]
    Uninitialized,
    Subscribed,
    /// Terminal
    Unsubscribed,
}

/// One rendered feed entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostCard {
    pub id: PostId,
    pub author: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    /// Optimistic count when a like toggle is in flight
    pub like_count: i64,
    /// Liked by this user during the current subscription
    pub liked: bool,
}

/// Immutable picture of the screen handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScreenView {
    pub posts: Vec<PostCard>,
    pub theme: Theme,
    pub author_input: String,
    pub body_input: String,
    pub phase: SyncPhase,
}

#[derive(Debug, Default)]
pub struct ScreenState {
    snapshot: FeedSnapshot,
    theme: Theme,
    author_input: String,
    body_input: String,
    phase: SyncPhase,
    liked: HashSet<PostId>,
    /// Like counts written but not yet confirmed by a snapshot
    pending_likes: HashMap<PostId, i64>,
}

impl ScreenState {
    pub fn new(author: impl Into<String>, theme: Theme) -> Self {
        Self {
            author_input: author.into(),
            theme,
            ..Default::default()
        }
    }

    pub fn phase(&self) -> SyncPhase {
        self.phase
    }

    pub fn set_phase(&mut self, phase: SyncPhase) {
        self.phase = phase;
    }

    /// Forget everything tied to the previous subscription
    pub fn reset_for_subscription(&mut self) {
        self.liked.clear();
        self.pending_likes.clear();
    }

    /// Replace the feed wholesale.
    ///
    /// Liked flags survive only for posts still present; optimistic counts
    /// are always dropped in favour of the snapshot's.
    pub fn apply_snapshot(&mut self, snapshot: FeedSnapshot) {
        let present: HashSet<&PostId> = snapshot.iter().map(|p| &p.id).collect();
        self.liked.retain(|id| present.contains(id));
        self.pending_likes.clear();
        self.snapshot = snapshot;
    }

    pub fn post_count(&self) -> usize {
        self.snapshot.len()
    }

    /// Id of the post at a 0-based feed position
    pub fn post_id_at(&self, index: usize) -> Option<PostId> {
        self.snapshot.get(index).map(|p| p.id.clone())
    }

    pub fn is_liked(&self, id: &PostId) -> bool {
        self.liked.contains(id)
    }

    /// Count currently shown for a post
    pub fn displayed_like_count(&self, id: &PostId) -> Option<i64> {
        if let Some(count) = self.pending_likes.get(id) {
            return Some(*count);
        }
        self.snapshot
            .iter()
            .find(|p| &p.id == id)
            .map(|p| p.like_count)
    }

    /// Flip the liked flag and return the count to write.
    ///
    /// Returns `None` when the post is not in the feed.
    pub fn toggle_like(&mut self, id: &PostId) -> Option<i64> {
        let base = self.displayed_like_count(id)?;

        let liked = !self.liked.remove(id);
        if liked {
            self.liked.insert(id.clone());
        }

        let wanted = if liked { base + 1 } else { base - 1 };
        let new_count = if wanted < 0 {
            tracing::warn!(post_id = %id, base, "Like count would go negative, clamping to 0");
            0
        } else {
            wanted
        };

        self.pending_likes.insert(id.clone(), new_count);
        Some(new_count)
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author_input = author.into();
    }

    pub fn set_body(&mut self, body: impl Into<String>) {
        self.body_input = body.into();
    }

    /// Build a post from the inputs and clear the body.
    ///
    /// Leaves both inputs untouched when either is blank.
    pub fn take_submission(&mut self) -> Option<NewPost> {
        let post = NewPost::compose(&self.author_input, &self.body_input)?;
        self.body_input.clear();
        Some(post)
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme;
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        self.theme
    }

    pub fn view(&self) -> ScreenView {
        let posts = self
            .snapshot
            .iter()
            .map(|post| PostCard {
                id: post.id.clone(),
                author: post.author.clone(),
                body: post.body.clone(),
                created_at: post.created_at,
                like_count: self
                    .pending_likes
                    .get(&post.id)
                    .copied()
                    .unwrap_or(post.like_count),
                liked: self.liked.contains(&post.id),
            })
            .collect();

        ScreenView {
            posts,
            theme: self.theme,
            author_input: self.author_input.clone(),
            body_input: self.body_input.clone(),
            phase: self.phase,
        }
    }
}

/// Screen state shared between the sync controller, the handlers and the
/// presentation layer
pub struct SharedScreen {
    state: RwLock<ScreenState>,
    views: watch::Sender<ScreenView>,
}

impl SharedScreen {
    pub fn new(state: ScreenState) -> Arc<Self> {
        let (views, _rx) = watch::channel(state.view());
        Arc::new(Self {
            state: RwLock::new(state),
            views,
        })
    }

    /// Run a transition and publish the resulting view if it changed
    pub fn update<R>(&self, f: impl FnOnce(&mut ScreenState) -> R) -> R {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut state);
        let view = state.view();
        self.views.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
        result
    }

    pub fn read<R>(&self, f: impl FnOnce(&ScreenState) -> R) -> R {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    pub fn view(&self) -> ScreenView {
        self.views.borrow().clone()
    }

    /// Receive every published view, starting with the current one
    pub fn watch(&self) -> watch::Receiver<ScreenView> {
        self.views.subscribe()
    }
}
