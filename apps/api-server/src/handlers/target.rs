//! Content addressed by `{kind}/{id}` in comment and engagement routes.

use uuid::Uuid;

use nearly_core::domain::{
    Activity, Comment, ContentKind, Counted, Counter, Event, Group, Likeable, News, Poll, Reel,
};
use nearly_core::ports::{BaseRepository, CounterRepository};

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

pub(crate) enum Target {
    Activity(Activity),
    Event(Event),
    Group(Group),
    News(News),
    Poll(Poll),
    Reel(Reel),
    Comment(Comment),
}

impl Target {
    pub(crate) fn parse_kind(kind: &str) -> AppResult<ContentKind> {
        Ok(kind.parse::<ContentKind>()?)
    }

    pub(crate) async fn load(state: &AppState, kind: ContentKind, id: Uuid) -> AppResult<Self> {
        let repos = &state.repos;
        let found = match kind {
            ContentKind::Activity => repos.activities.find_by_id(id).await?.map(Target::Activity),
            ContentKind::Event => repos.events.find_by_id(id).await?.map(Target::Event),
            ContentKind::Group => repos.groups.find_by_id(id).await?.map(Target::Group),
            ContentKind::News => repos.news.find_by_id(id).await?.map(Target::News),
            ContentKind::Poll => repos.polls.find_by_id(id).await?.map(Target::Poll),
            ContentKind::Reel => repos.reels.find_by_id(id).await?.map(Target::Reel),
            ContentKind::Comment => repos.comments.find_by_id(id).await?.map(Target::Comment),
        };
        found.ok_or_else(|| AppError::NotFound(format!("{kind} {id} not found")))
    }

    pub(crate) fn kind(&self) -> ContentKind {
        match self {
            Target::Activity(_) => ContentKind::Activity,
            Target::Event(_) => ContentKind::Event,
            Target::Group(_) => ContentKind::Group,
            Target::News(_) => ContentKind::News,
            Target::Poll(_) => ContentKind::Poll,
            Target::Reel(_) => ContentKind::Reel,
            Target::Comment(_) => ContentKind::Comment,
        }
    }

    /// User who is notified about activity on this content.
    pub(crate) fn owner_id(&self) -> Uuid {
        match self {
            Target::Activity(a) => a.user_id,
            Target::Event(e) => e.host_id,
            Target::Group(g) => g.owner_id,
            Target::News(n) => n.author_id,
            Target::Poll(p) => p.author_id,
            Target::Reel(r) => r.user_id,
            Target::Comment(c) => c.user_id,
        }
    }

    /// `None` for content without a like counter.
    pub(crate) fn likeable(&mut self) -> Option<&mut dyn Likeable> {
        match self {
            Target::Activity(a) => Some(a as &mut dyn Likeable),
            Target::News(n) => Some(n as &mut dyn Likeable),
            Target::Reel(r) => Some(r as &mut dyn Likeable),
            Target::Comment(c) => Some(c as &mut dyn Likeable),
            Target::Event(_) | Target::Group(_) | Target::Poll(_) => None,
        }
    }

    fn counted(&mut self) -> Option<&mut dyn Counted> {
        match self {
            Target::Activity(a) => Some(a as &mut dyn Counted),
            Target::Event(e) => Some(e as &mut dyn Counted),
            Target::Group(g) => Some(g as &mut dyn Counted),
            Target::News(n) => Some(n as &mut dyn Counted),
            Target::Reel(r) => Some(r as &mut dyn Counted),
            Target::Comment(c) => Some(c as &mut dyn Counted),
            Target::Poll(_) => None,
        }
    }

    /// Move a counter in storage and mirror the stored value into the local
    /// copy for the response body. `None` for content without that counter.
    pub(crate) async fn bump(
        &mut self,
        state: &AppState,
        counter: Counter,
        delta: i64,
    ) -> AppResult<Option<i64>> {
        if !counter.applies_to(self.kind()) {
            return Ok(None);
        }

        let repos = &state.repos;
        let stored = match self {
            Target::Activity(a) => repos.activities.bump(a.id, counter, delta).await?,
            Target::Event(e) => repos.events.bump(e.id, counter, delta).await?,
            Target::Group(g) => repos.groups.bump(g.id, counter, delta).await?,
            Target::News(n) => repos.news.bump(n.id, counter, delta).await?,
            Target::Reel(r) => repos.reels.bump(r.id, counter, delta).await?,
            Target::Comment(c) => repos.comments.bump(c.id, counter, delta).await?,
            Target::Poll(_) => return Ok(None),
        };

        if let Some(slot) = self.counted().and_then(|c| c.counter_mut(counter)) {
            *slot = stored;
        }
        Ok(Some(stored))
    }
}
