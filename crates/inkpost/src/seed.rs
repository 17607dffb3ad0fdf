//! Demo data seeding
//!
//! Every step checks for existing rows first, so seeding twice is a no-op.

use anyhow::{Context, Result};
use inkpost_api::AppState;
use inkpost_db::{NewCategory, NewPost, NewUser};
use tracing::info;

const DEMO_USERS: &[(&str, &str, &str)] = &[
    ("demo@example.com", "Demo User", "demo123456"),
    ("test@example.com", "Test User", "test123456"),
];

const CATEGORIES: &[(&str, &str, &str)] = &[
    ("Technology", "technology", "Posts about technology and programming"),
    ("Design", "design", "Posts about design and UX"),
    ("Business", "business", "Posts about business and entrepreneurship"),
    ("Sports", "sports", "Posts about sports and athletics"),
    ("Gaming", "gaming", "Posts about video games and gaming culture"),
    ("Music", "music", "Posts about music and musicians"),
    ("Art", "art", "Posts about art and creative expression"),
    ("Photography", "photography", "Posts about photography and visual arts"),
    ("Fashion", "fashion", "Posts about fashion and style"),
    ("Finance", "finance", "Posts about finance and investing"),
    ("Politics", "politics", "Posts about politics and current affairs"),
    ("Environment", "environment", "Posts about environment and sustainability"),
    ("DIY", "diy", "Posts about do-it-yourself projects"),
    ("Productivity", "productivity", "Posts about productivity and time management"),
    ("Marketing", "marketing", "Posts about marketing and advertising"),
    ("Career", "career", "Posts about career development"),
    ("Parenting", "parenting", "Posts about parenting and family"),
    ("Pets", "pets", "Posts about pets and animals"),
    ("Books", "books", "Posts about books and reading"),
    ("Movies", "movies", "Posts about movies and cinema"),
    ("News", "news", "Posts about news and current events"),
    ("Opinion", "opinion", "Posts with personal opinions and commentary"),
    ("Tutorial", "tutorial", "Posts with step-by-step tutorials"),
    ("Review", "review", "Posts with product and service reviews"),
];

struct SamplePost {
    title: &'static str,
    slug: &'static str,
    content: &'static str,
    excerpt: &'static str,
    category: &'static str,
}

const SAMPLE_POSTS: &[SamplePost] = &[
    SamplePost {
        title: "Getting Started with Rust Web Services",
        slug: "getting-started-rust-web",
        content: "# Getting Started with Rust Web Services\n\nRust gives you a fast, memory safe foundation for building web backends...",
        excerpt: "Learn the basics of building web services in Rust.",
        category: "technology",
    },
    SamplePost {
        title: "The Future of Web Design",
        slug: "future-web-design",
        content: "# The Future of Web Design\n\nWeb design is constantly evolving...",
        excerpt: "Explore emerging trends in web design and UX.",
        category: "design",
    },
];

/// Create demo accounts, the default categories and two published posts
pub async fn seed_demo_data(state: &AppState) -> Result<()> {
    info!("Seeding demo data");
    let db = &state.db;

    for &(email, name, password) in DEMO_USERS {
        if db.get_user_by_email(email).await?.is_some() {
            continue;
        }
        let password = state.hash_password(password.to_string()).await?;
        db.insert_user(NewUser {
            email: email.to_string(),
            name: name.to_string(),
            password,
        })
        .await
        .with_context(|| format!("Failed to create demo user {}", email))?;
        info!("Created demo user {}", email);
    }

    let categories: Vec<NewCategory> = CATEGORIES
        .iter()
        .map(|&(name, slug, description)| NewCategory {
            name: name.to_string(),
            slug: slug.to_string(),
            description: Some(description.to_string()),
        })
        .collect();
    let created = db.insert_categories_if_missing(&categories).await?;
    if created > 0 {
        info!("Created {} categories", created);
    }

    let author = db
        .get_user_by_email(DEMO_USERS[0].0)
        .await?
        .context("Demo author missing after seeding users")?;

    for sample in SAMPLE_POSTS {
        if db.get_post_by_slug(sample.slug).await?.is_some() {
            continue;
        }

        let category_ids = db
            .get_category_by_slug(sample.category)
            .await?
            .map(|c| vec![c.id])
            .unwrap_or_default();

        let post = db
            .insert_post(NewPost {
                title: sample.title.to_string(),
                slug: sample.slug.to_string(),
                content: sample.content.to_string(),
                excerpt: Some(sample.excerpt.to_string()),
                author_id: author.id.clone(),
                category_ids,
            })
            .await
            .with_context(|| format!("Failed to create sample post {}", sample.slug))?;
        db.set_post_published(post.id, true).await?;
        info!("Created sample post {}", sample.slug);
    }

    info!("Demo credentials: demo@example.com / demo123456, test@example.com / test123456");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkpost_auth::{AccessGuard, JwtManager, PasswordHasher, SessionCookies};
    use inkpost_db::Database;
    use std::sync::Arc;

    async fn state() -> AppState {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let jwt = Arc::new(JwtManager::new("seed-secret", chrono::Duration::days(7)));
        let guard = AccessGuard::new(jwt.clone(), vec!["/dashboard".to_string()], "/auth/login");
        AppState::new(db, jwt, PasswordHasher::new(1_000), SessionCookies::default(), guard)
    }

    #[tokio::test]
    async fn test_seed_is_idempotent() {
        let state = state().await;

        seed_demo_data(&state).await.unwrap();
        seed_demo_data(&state).await.unwrap();

        assert_eq!(state.db.list_categories().await.unwrap().len(), CATEGORIES.len());

        let published = state.db.list_published_posts().await.unwrap();
        assert_eq!(published.len(), SAMPLE_POSTS.len());

        let demo = state.db.get_user_by_email("demo@example.com").await.unwrap().unwrap();
        assert!(state.passwords.verify("demo123456", &demo.password));
        assert!(published.iter().all(|p| p.is_owned_by(&demo.id)));

        let design = state.db.get_category_by_slug("design").await.unwrap().unwrap();
        let in_design = state.db.list_published_posts_in_category(design.id).await.unwrap();
        assert_eq!(in_design.len(), 1);
        assert_eq!(in_design[0].slug, "future-web-design");
    }
}
