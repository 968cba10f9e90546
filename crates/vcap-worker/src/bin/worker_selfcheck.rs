use std::path::Path;

use vcap_media::check_ffmpeg;
use vcap_queue::JobQueue;
use vcap_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env();

    println!(
        "worker-selfcheck: starting with work_dir={}",
        config.work_dir.display()
    );
    ensure_workdir(&config.work_dir).await?;
    ensure_ffmpeg()?;
    ensure_script(&config.ffmpeg_script)?;
    ensure_redis().await?;

    println!("worker-selfcheck: ok");
    Ok(())
}

async fn ensure_workdir(path: &Path) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(path).await?;
    let probe = tempfile::NamedTempFile::new_in(path)
        .map_err(|e| anyhow::anyhow!("work dir {} not writable: {}", path.display(), e))?;
    probe.close()?;
    Ok(())
}

fn ensure_ffmpeg() -> anyhow::Result<()> {
    let path = check_ffmpeg().map_err(|e| anyhow::anyhow!("ffmpeg not available: {}", e))?;
    println!("worker-selfcheck: ffmpeg at {}", path.display());
    Ok(())
}

fn ensure_script(script: &Path) -> anyhow::Result<()> {
    if !script.is_file() {
        return Err(anyhow::anyhow!(
            "overlay script {} not found",
            script.display()
        ));
    }
    Ok(())
}

async fn ensure_redis() -> anyhow::Result<()> {
    let queue = JobQueue::from_env()?;
    queue
        .ping()
        .await
        .map_err(|e| anyhow::anyhow!("redis not reachable: {}", e))?;
    println!(
        "worker-selfcheck: redis ok, {} pending on {}",
        queue.len().await?,
        queue.config().queue_name
    );
    Ok(())
}
