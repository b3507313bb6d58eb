//! [`MongoStore`] — the MongoDB implementation of [`BlogStore`].

use bson::{Bson, Document, doc, oid::ObjectId};
use chrono::Utc;
use futures::TryStreamExt as _;
use mongodb::{
  Client, Collection, IndexModel,
  options::{IndexOptions, ReturnDocument},
};

use byline_core::{
  identity::{NewUser, User},
  post::{LikeOutcome, NewPost, Post, PostPatch},
  profile::{NewProfile, Profile, ProfilePatch},
  store::{BlogStore, PostQuery},
};

use crate::{
  Result,
  doc::{PostDoc, ProfileDoc, UserDoc},
};

/// A blog store backed by MongoDB.
///
/// Cloning is cheap — the driver's client and collection handles are
/// reference-counted.
#[derive(Clone)]
pub struct MongoStore {
  users:    Collection<UserDoc>,
  posts:    Collection<PostDoc>,
  profiles: Collection<ProfileDoc>,
}

impl MongoStore {
  /// Connect to `uri`, verify the connection, and ensure indexes.
  pub async fn connect(uri: &str, db_name: &str) -> Result<Self> {
    tracing::info!(%db_name, "connecting to MongoDB");

    // Bound server selection so an unreachable deployment fails fast
    // instead of hanging the first operation.
    let sep = if uri.contains('?') { '&' } else { '?' };
    let uri = format!("{uri}{sep}serverSelectionTimeoutMS=3000&connectTimeoutMS=3000");

    let client = Client::with_uri_str(&uri).await?;
    let db = client.database(db_name);
    db.run_command(doc! { "ping": 1 }).await?;

    let store = Self {
      users:    db.collection("users"),
      posts:    db.collection("posts"),
      profiles: db.collection("profiles"),
    };
    store.ensure_indexes().await?;

    tracing::info!(%db_name, "connected to MongoDB");
    Ok(store)
  }

  async fn ensure_indexes(&self) -> Result<()> {
    let unique = |keys: Document| {
      IndexModel::builder()
        .keys(keys)
        .options(IndexOptions::builder().unique(true).build())
        .build()
    };
    // Identities are unique by join key; profiles one-to-one by owner.
    self.users.create_index(unique(doc! { "username": 1 })).await?;
    self
      .profiles
      .create_index(unique(doc! { "user.username": 1 }))
      .await?;
    self
      .posts
      .create_index(IndexModel::builder().keys(doc! { "created_at": -1 }).build())
      .await?;
    Ok(())
  }
}

fn now_bson() -> Bson {
  Bson::DateTime(bson::DateTime::from_chrono(Utc::now()))
}

/// Unique-index violations surface as server write error 11000.
fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
  matches!(
    *err.kind,
    mongodb::error::ErrorKind::Write(
      mongodb::error::WriteFailure::WriteError(ref write),
    ) if write.code == 11000
  )
}

/// Anchored, escaped, case-insensitive whole-string match.
fn ci_exact(value: &str) -> Document {
  doc! { "$regex": format!("^{}$", regex::escape(value)), "$options": "i" }
}

impl BlogStore for MongoStore {
  type Error = crate::Error;

  // ── Identities ────────────────────────────────────────────────────────

  async fn find_user(&self, username: &str) -> Result<Option<User>> {
    let doc = self.users.find_one(doc! { "username": username }).await?;
    Ok(doc.map(User::from))
  }

  async fn insert_user(&self, input: NewUser) -> Result<User> {
    let doc = UserDoc {
      id:           Some(ObjectId::new()),
      username:     input.username,
      email:        input.email,
      display_name: input.display_name,
      created_at:   Utc::now(),
    };
    self.users.insert_one(&doc).await.map_err(|e| {
      if is_duplicate_key(&e) {
        crate::Error::UserExists(doc.username.clone())
      } else {
        e.into()
      }
    })?;
    Ok(doc.into())
  }

  async fn set_display_name(
    &self,
    username: &str,
    display_name: &str,
  ) -> Result<()> {
    self
      .users
      .update_one(
        doc! { "username": username },
        doc! { "$set": { "display_name": display_name } },
      )
      .await?;
    Ok(())
  }

  // ── Posts ─────────────────────────────────────────────────────────────

  async fn insert_post(&self, author: &User, input: NewPost) -> Result<Post> {
    let now = Utc::now();
    let doc = PostDoc {
      id:         ObjectId::new(),
      title:      input.title,
      content:    input.content,
      image_url:  input.image_url,
      author:     author.into(),
      created_at: now,
      updated_at: now,
      views:      0,
      likes:      Vec::new(),
    };
    self.posts.insert_one(&doc).await?;
    Ok(doc.into())
  }

  async fn get_post(&self, id: ObjectId) -> Result<Option<Post>> {
    let doc = self.posts.find_one(doc! { "_id": id }).await?;
    Ok(doc.map(Post::from))
  }

  async fn list_posts(&self, query: &PostQuery) -> Result<Vec<Post>> {
    let filter = match &query.author {
      None => doc! {},
      Some(author) => {
        // Union of join-key, email, and email-local-prefix matches; `$or`
        // yields each document once, which is the required de-duplication.
        let mut clauses = vec![
          doc! { "author.username": author },
          doc! { "author.email": author },
        ];
        if let Some((local, _)) = author.split_once('@') {
          clauses.push(doc! {
            "author.email": { "$regex": format!("^{}", regex::escape(local)) }
          });
        }
        doc! { "$or": clauses }
      }
    };

    let cursor = self
      .posts
      .find(filter)
      .sort(doc! { "created_at": -1 })
      .await?;
    let docs: Vec<PostDoc> = cursor.try_collect().await?;
    Ok(docs.into_iter().map(Post::from).collect())
  }

  async fn update_post(
    &self,
    id: ObjectId,
    patch: PostPatch,
  ) -> Result<Option<Post>> {
    let mut set = doc! { "updated_at": now_bson() };
    if let Some(title) = patch.title {
      set.insert("title", title);
    }
    if let Some(content) = patch.content {
      set.insert("content", content);
    }
    match patch.image_url {
      Some(Some(url)) => {
        set.insert("image_url", url);
      }
      Some(None) => {
        set.insert("image_url", Bson::Null);
      }
      None => {}
    }

    let doc = self
      .posts
      .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
      .return_document(ReturnDocument::After)
      .await?;
    Ok(doc.map(Post::from))
  }

  async fn delete_post(&self, id: ObjectId) -> Result<bool> {
    let result = self.posts.delete_one(doc! { "_id": id }).await?;
    Ok(result.deleted_count > 0)
  }

  async fn increment_views(&self, id: ObjectId) -> Result<Option<u64>> {
    let doc = self
      .posts
      .find_one_and_update(doc! { "_id": id }, doc! { "$inc": { "views": 1 } })
      .return_document(ReturnDocument::After)
      .await?;
    Ok(doc.map(|d| d.views))
  }

  async fn toggle_like(
    &self,
    id: ObjectId,
    username: &str,
  ) -> Result<Option<LikeOutcome>> {
    let Some(current) = self.posts.find_one(doc! { "_id": id }).await? else {
      return Ok(None);
    };

    // `$addToSet`/`$pull` are idempotent per identity, so a racing double
    // toggle settles on one of the two valid outcomes.
    let (update, liked) = if current.likes.iter().any(|u| u == username) {
      (doc! { "$pull": { "likes": username } }, false)
    } else {
      (doc! { "$addToSet": { "likes": username } }, true)
    };

    let updated = self
      .posts
      .find_one_and_update(doc! { "_id": id }, update)
      .return_document(ReturnDocument::After)
      .await?;
    Ok(updated.map(|d| {
      let count = d.likes.len() as u64;
      if liked {
        LikeOutcome::Liked { count }
      } else {
        LikeOutcome::Unliked { count }
      }
    }))
  }

  async fn posts_liked_by(&self, username: &str) -> Result<Vec<Post>> {
    let cursor = self
      .posts
      .find(doc! { "likes": username })
      .sort(doc! { "created_at": -1 })
      .await?;
    let docs: Vec<PostDoc> = cursor.try_collect().await?;
    Ok(docs.into_iter().map(Post::from).collect())
  }

  async fn count_posts_by(&self, username: &str) -> Result<u64> {
    let count = self
      .posts
      .count_documents(doc! { "author.username": username })
      .await?;
    Ok(count)
  }

  // ── Profiles ──────────────────────────────────────────────────────────

  async fn get_profile(&self, id: ObjectId) -> Result<Option<Profile>> {
    let doc = self.profiles.find_one(doc! { "_id": id }).await?;
    Ok(doc.map(Profile::from))
  }

  async fn find_profile(&self, username: &str) -> Result<Option<Profile>> {
    let doc = self
      .profiles
      .find_one(doc! { "user.username": username })
      .await?;
    Ok(doc.map(Profile::from))
  }

  async fn find_profile_ci(&self, username: &str) -> Result<Option<Profile>> {
    let doc = self
      .profiles
      .find_one(doc! { "user.username": ci_exact(username) })
      .await?;
    Ok(doc.map(Profile::from))
  }

  async fn find_profile_by_display_name(
    &self,
    fragment: &str,
  ) -> Result<Option<Profile>> {
    let doc = self
      .profiles
      .find_one(doc! {
        "display_name": { "$regex": regex::escape(fragment), "$options": "i" }
      })
      .await?;
    Ok(doc.map(Profile::from))
  }

  async fn insert_profile(
    &self,
    owner: &User,
    input: NewProfile,
  ) -> Result<Profile> {
    let now = Utc::now();
    let doc = ProfileDoc {
      id:           ObjectId::new(),
      user:         owner.into(),
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
    self.profiles.insert_one(&doc).await.map_err(|e| {
      if is_duplicate_key(&e) {
        crate::Error::ProfileExists(doc.user.username.clone())
      } else {
        e.into()
      }
    })?;
    Ok(doc.into())
  }

  async fn update_profile(
    &self,
    id: ObjectId,
    patch: ProfilePatch,
  ) -> Result<Option<Profile>> {
    let mut set = doc! { "updated_at": now_bson() };
    if let Some(display_name) = patch.display_name {
      set.insert("display_name", display_name);
    }
    if let Some(bio) = patch.bio {
      set.insert("bio", bio);
    }
    if let Some(profession) = patch.profession {
      set.insert("profession", profession);
    }
    if let Some(gender) = patch.gender {
      set.insert("gender", gender);
    }
    if let Some(location) = patch.location {
      set.insert("location", location);
    }
    if let Some(website) = patch.website {
      set.insert("website", website);
    }
    match patch.avatar_url {
      Some(Some(url)) => {
        set.insert("avatar_url", url);
      }
      Some(None) => {
        set.insert("avatar_url", Bson::Null);
      }
      None => {}
    }

    let doc = self
      .profiles
      .find_one_and_update(doc! { "_id": id }, doc! { "$set": set })
      .return_document(ReturnDocument::After)
      .await?;
    Ok(doc.map(Profile::from))
  }
}
