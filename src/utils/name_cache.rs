use anyhow::Result;
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::Lazy;
use sqlx::PgPool;
use std::time::Duration;

/// true  => name is TAKEN
/// false => name is AVAILABLE (usually we store only taken)
pub static NAME_CACHE: Lazy<Cache<String, bool>> = Lazy::new(|| {
    Cache::builder()
        .max_capacity(500_000) // tune based on memory
        .time_to_live(Duration::from_secs(86400)) // 24h TTL
        .build()
});

/// Mark a single name as taken
pub async fn mark_taken(name: &str) {
    NAME_CACHE.insert(name.trim().to_lowercase(), true).await;
}

/// Check if a name is taken
pub async fn is_taken(name: &str) -> bool {
    NAME_CACHE
        .get(&name.trim().to_lowercase())
        .await
        .unwrap_or(false)
}

/// Drop a name after its employee was deleted
pub async fn release(name: &str) {
    NAME_CACHE.invalidate(&name.trim().to_lowercase()).await;
}

/// Batch mark names as taken
async fn batch_mark(names: &[String]) {
    let futures: Vec<_> = names
        .iter()
        .map(|n| NAME_CACHE.insert(n.trim().to_lowercase(), true))
        .collect();

    // Await all insertions concurrently
    futures::future::join_all(futures).await;
}

/// Load only RECENTLY ACTIVE employee names into the in-memory cache
/// (batched). Activity is judged by attendance, most recent first.
pub async fn warmup_name_cache(pool: &PgPool, days: u32, batch_size: usize) -> Result<()> {
    let mut stream = sqlx::query_as::<_, (String,)>(
        r#"
        SELECT e.name
        FROM employees e
        JOIN attendance a ON a.employee_id = e.id
        WHERE a.date >= CURRENT_DATE - ($1::int)
        GROUP BY e.name
        ORDER BY MAX(a.date) DESC
        "#,
    )
    .bind(days as i32)
    .fetch(pool);

    let mut batch = Vec::with_capacity(batch_size);
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let (name,) = row?;
        batch.push(name);
        total_count += 1;

        if batch.len() >= batch_size {
            batch_mark(&batch).await;
            batch.clear();
        }
    }

    // Insert any remaining names
    if !batch.is_empty() {
        batch_mark(&batch).await;
    }

    log::info!(
        "Name cache warmup complete: {} active employees (last {} days)",
        total_count,
        days
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn mark_then_check() {
        mark_taken("Cache Carol Unique").await;
        assert!(is_taken("cache carol unique").await);
        assert!(is_taken("  Cache Carol UNIQUE ").await);
    }

    #[actix_web::test]
    async fn unknown_name_is_available() {
        assert!(!is_taken("Cache Nobody Registered").await);
    }

    #[actix_web::test]
    async fn release_frees_the_name() {
        mark_taken("Cache Dave Leaving").await;
        assert!(is_taken("Cache Dave Leaving").await);
        release("cache dave leaving").await;
        assert!(!is_taken("Cache Dave Leaving").await);
    }
}
