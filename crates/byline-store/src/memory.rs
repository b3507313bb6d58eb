//! [`MemoryStore`] — an in-memory implementation of [`BlogStore`] for tests
//! and local development.
//!
//! Lock-free maps keyed the way the MongoDB backend indexes: users by join
//! key, posts and profiles by native key. Per-entry mutation through the
//! map's guards gives the same atomicity the Mongo update operators provide.

use bson::oid::ObjectId;
use chrono::Utc;
use dashmap::DashMap;

use byline_core::{
  identity::{NewUser, User},
  post::{LikeOutcome, NewPost, Post, PostPatch},
  profile::{NewProfile, Profile, ProfilePatch},
  store::{BlogStore, PostQuery},
};

use crate::{Error, Result};

#[derive(Default)]
pub struct MemoryStore {
  users:    DashMap<String, User>,
  posts:    DashMap<ObjectId, Post>,
  profiles: DashMap<ObjectId, Profile>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }

  fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by(|a, b| {
      b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
    });
    posts
  }
}

impl BlogStore for MemoryStore {
  type Error = Error;

  // ── Identities ────────────────────────────────────────────────────────

  async fn find_user(&self, username: &str) -> Result<Option<User>> {
    Ok(self.users.get(username).map(|u| u.clone()))
  }

  async fn insert_user(&self, input: NewUser) -> Result<User> {
    use dashmap::mapref::entry::Entry;
    let user = User {
      id:           Some(ObjectId::new()),
      username:     input.username.clone(),
      email:        input.email,
      display_name: input.display_name,
      created_at:   Utc::now(),
    };
    match self.users.entry(input.username) {
      Entry::Occupied(e) => Err(Error::UserExists(e.key().clone())),
      Entry::Vacant(e) => {
        e.insert(user.clone());
        Ok(user)
      }
    }
  }

  async fn set_display_name(
    &self,
    username: &str,
    display_name: &str,
  ) -> Result<()> {
    if let Some(mut user) = self.users.get_mut(username) {
      user.display_name = display_name.to_string();
    }
    Ok(())
  }

  // ── Posts ─────────────────────────────────────────────────────────────

  async fn insert_post(&self, author: &User, input: NewPost) -> Result<Post> {
    let now = Utc::now();
    let post = Post {
      id:         ObjectId::new(),
      title:      input.title,
      content:    input.content,
      image_url:  input.image_url,
      author:     author.clone(),
      created_at: now,
      updated_at: now,
      views:      0,
      likes:      Vec::new(),
    };
    self.posts.insert(post.id, post.clone());
    Ok(post)
  }

  async fn get_post(&self, id: ObjectId) -> Result<Option<Post>> {
    Ok(self.posts.get(&id).map(|p| p.clone()))
  }

  async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>> {
    let matches: Vec<Post> = self
      .posts
      .iter()
      .filter(|p| match &query.author {
        None => true,
        Some(author) => {
          // One pass over the three strategies is the unioned,
          // de-duplicated result.
          p.author.username == *author
            || p.author.email == *author
            || author
              .split_once('@')
              .is_some_and(|(local, _)| p.author.email.starts_with(local))
        }
      })
      .map(|p| p.clone())
      .collect();
    Ok(Self::newest_first(matches))
  }

  async fn update_post(
    &self,
    id: ObjectId,
    patch: PostPatch,
  ) -> Result<Option<Post>> {
    let Some(mut post) = self.posts.get_mut(&id) else {
      return Ok(None);
    };
    if let Some(title) = patch.title {
      post.title = title;
    }
    if let Some(content) = patch.content {
      post.content = content;
    }
    if let Some(image_url) = patch.image_url {
      post.image_url = image_url;
    }
    post.updated_at = Utc::now();
    Ok(Some(post.clone()))
  }

  async fn delete_post(&self, id: ObjectId) -> Result<bool> {
    Ok(self.posts.remove(&id).is_some())
  }

  async fn increment_views(&self, id: ObjectId) -> Result<Option<u64>> {
    let Some(mut post) = self.posts.get_mut(&id) else {
      return Ok(None);
    };
    post.views += 1;
    Ok(Some(post.views))
  }

  async fn toggle_like(
    &self,
    id: ObjectId,
    username: &str,
  ) -> Result<Option<LikeOutcome>> {
    let Some(mut post) = self.posts.get_mut(&id) else {
      return Ok(None);
    };
    let outcome = match post.likes.iter().position(|u| u == username) {
      Some(index) => {
        post.likes.remove(index);
        LikeOutcome::Unliked { count: post.likes.len() as u64 }
      }
      None => {
        post.likes.push(username.to_string());
        LikeOutcome::Liked { count: post.likes.len() as u64 }
      }
    };
    Ok(Some(outcome))
  }

  async fn posts_liked_by(&self, username: &str) -> Result<Vec<Post>> {
    let matches: Vec<Post> = self
      .posts
      .iter()
      .filter(|p| p.liked_by(username))
      .map(|p| p.clone())
      .collect();
    Ok(Self::newest_first(matches))
  }

  async fn count_posts_by(&self, username: &str) -> Result<u64> {
    let count = self
      .posts
      .iter()
      .filter(|p| p.author.username == username)
      .count();
    Ok(count as u64)
  }

  // ── Profiles ──────────────────────────────────────────────────────────

  async fn get_profile(&self, id: ObjectId) -> Result<Option<Profile>> {
    Ok(self.profiles.get(&id).map(|p| p.clone()))
  }

  async fn find_profile(&self, username: &str) -> Result<Option<Profile>> {
    Ok(
      self
        .profiles
        .iter()
        .find(|p| p.user.username == username)
        .map(|p| p.clone()),
    )
  }

  async fn find_profile_ci(&self, username: &str) -> Result<Option<Profile>> {
    Ok(
      self
        .profiles
        .iter()
        .find(|p| p.user.username.eq_ignore_ascii_case(username))
        .map(|p| p.clone()),
    )
  }

  async fn find_profile_by_display_name(
    &self,
    fragment: &str,
  ) -> Result<Option<Profile>> {
    let fragment = fragment.to_lowercase();
    Ok(
      self
        .profiles
        .iter()
        .find(|p| p.display_name.to_lowercase().contains(&fragment))
        .map(|p| p.clone()),
    )
  }

  async fn insert_profile(
    &self,
    owner: &User,
    input: NewProfile,
  ) -> Result<Profile> {
    if self.find_profile(&owner.username).await?.is_some() {
      return Err(Error::ProfileExists(owner.username.clone()));
    }
    let now = Utc::now();
    let profile = Profile {
      id:           ObjectId::new(),
      user:         owner.clone(),
      display_name: input.display_name,
      bio:          String::new(),
      profession:   String::new(),
      gender:       String::new(),
      location:     String::new(),
      website:      String::new(),
      avatar_url:   None,
      created_at:   now,
      updated_at:   now,
    };
    self.profiles.insert(profile.id, profile.clone());
    Ok(profile)
  }

  async fn update_profile(
    &self,
    id: ObjectId,
    patch: ProfilePatch,
  ) -> Result<Option<Profile>> {
    let Some(mut profile) = self.profiles.get_mut(&id) else {
      return Ok(None);
    };
    if let Some(display_name) = patch.display_name {
      profile.display_name = display_name;
    }
    if let Some(bio) = patch.bio {
      profile.bio = bio;
    }
    if let Some(profession) = patch.profession {
      profile.profession = profession;
    }
    if let Some(gender) = patch.gender {
      profile.gender = gender;
    }
    if let Some(location) = patch.location {
      profile.location = location;
    }
    if let Some(website) = patch.website {
      profile.website = website;
    }
    if let Some(avatar_url) = patch.avatar_url {
      profile.avatar_url = avatar_url;
    }
    profile.updated_at = Utc::now();
    Ok(Some(profile.clone()))
  }
}
