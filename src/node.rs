use crate::config::MatchConfig;
use crate::video_matching::Upload;
use crate::video_matching::pipeline::run_batch;
use napi::bindgen_prelude::*;
use napi_derive::napi;

#[napi(object)]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct JsUpload {
    pub name: String,
    pub path: String,
}

#[napi(object)]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct JsRenamedVideo {
    pub original_name: String,
    pub new_name: String,
    pub image_name: String,
    pub score: f64,
}

#[napi(object)]
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct JsRunReport {
    pub renamed: Vec<JsRenamedVideo>,
    pub skipped: Vec<String>,
    pub archive_path: Option<String>,
}

fn read_uploads(uploads: &[JsUpload]) -> Result<Vec<Upload>> {
    uploads
        .iter()
        .map(|u| {
            std::fs::read(&u.path)
                .map(|bytes| Upload::new(u.name.clone(), bytes))
                .map_err(|e| Error::from_reason(format!("Failed to read {}: {}", u.path, e)))
        })
        .collect()
}

/// Match videos to images and write the renamed videos to `archive_path`
#[napi]
pub fn match_videos(
    images: Vec<JsUpload>,
    videos: Vec<JsUpload>,
    archive_path: String,
) -> Result<JsRunReport> {
    let images = read_uploads(&images)?;
    let videos = read_uploads(&videos)?;

    let report = run_batch(&MatchConfig::default(), &images, &videos, &archive_path)
        .map_err(|e| Error::from_reason(format!("{:#}", e)))?;

    Ok(JsRunReport {
        renamed: report
            .renamed
            .into_iter()
            .map(|r| JsRenamedVideo {
                original_name: r.original_name,
                new_name: r.new_name,
                image_name: r.image_name,
                score: r.score,
            })
            .collect(),
        skipped: report.skipped.into_iter().map(|s| s.video_name).collect(),
        archive_path: report
            .archive_path
            .map(|p| p.to_string_lossy().to_string()),
    })
}
