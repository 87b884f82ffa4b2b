//! Training Pipeline
//!
//! load → impute → build features → stratified split → fit → evaluate →
//! persist. Each run writes one artifact and returns a [`TrainingReport`].

use crate::backend::resolve_builder;
use crate::evaluate::evaluate_binary;
use crate::settings::TrainingConfig;
use crate::split::stratified_split;
use crate::TrainingError;
use explainer::{Explainer, ExplainerConfig, FeatureContribution};
use feature_engine::{FeatureBuilder, FeatureMatrix};
use inference_engine::{ModelArtifact, ModelBackend};
use monitoring::{build_monitoring_baseline, PredictionMonitor, PredictionStats};
use sensor_data::{fill_missing_with_median, load_dataset, LabeledReadings};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use storage::ArtifactStore;
use tracing::{debug, info, warn};

/// Outcome of one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    pub roc_auc: f64,
    pub pr_auc: f64,
    pub f1: f64,
    pub expected_cost: f64,
    pub scale_pos_weight: f64,
    pub backend: ModelBackend,
    /// Holdout importance, largest magnitude first
    pub feature_importance: Vec<FeatureContribution>,
    pub holdout_stats: PredictionStats,
    pub train_rows: usize,
    pub test_rows: usize,
    pub model_path: PathBuf,
}

/// Train, evaluate and persist a model as configured
pub fn train(config: &TrainingConfig) -> Result<TrainingReport, TrainingError> {
    config.validate()?;
    let builder = resolve_builder(config)?;

    let mut frame = load_dataset(&config.data_path)?;
    fill_missing_with_median(&mut frame);
    let labeled = LabeledReadings::from_frame(&frame)?;
    if labeled.is_empty() {
        return Err(TrainingError::EmptyDataset);
    }
    info!(
        "Dataset: {} rows, {} failures",
        labeled.len(),
        labeled.positives()
    );

    let features = FeatureMatrix::from_vectors(&FeatureBuilder::new().build(&labeled.readings));
    let split = stratified_split(&labeled.failures, config.test_size, config.random_state)?;

    let x_train = features.rows(&split.train)?;
    let y_train = labels(&labeled.failures, &split.train);
    let positives = y_train.iter().filter(|&&l| l).count();
    let negatives = y_train.len() - positives;
    if positives == 0 || negatives == 0 {
        return Err(TrainingError::SingleClass);
    }
    let scale_pos_weight = negatives.max(1) as f64 / positives.max(1) as f64;
    debug!(
        "Train split: {} rows ({} positive), scale_pos_weight {:.3}",
        y_train.len(),
        positives,
        scale_pos_weight
    );

    let model = builder.fit(x_train.values().view(), &y_train, scale_pos_weight)?;

    let x_test = features.rows(&split.test)?;
    let y_test = labels(&labeled.failures, &split.test);
    let probabilities = if x_test.n_rows() == 0 {
        warn!("Test split is empty; metrics are degenerate");
        Vec::new()
    } else {
        model
            .classifier()
            .predict_proba(x_test.values().view())?
            .to_vec()
    };
    let metrics = evaluate_binary(&y_test, &probabilities, config.decision_threshold, &config.cost);
    info!(
        "Holdout metrics: roc_auc={:.4} pr_auc={:.4} f1={:.4} expected_cost={}",
        metrics.roc_auc, metrics.pr_auc, metrics.f1, metrics.expected_cost
    );

    let artifact = ModelArtifact::new(model, features.names().to_vec(), Some(metrics))?;
    ArtifactStore::new(&config.model_path).save(&artifact)?;

    let holdout_stats = PredictionMonitor::new(config.high_risk_threshold).summarize(&probabilities);
    let feature_importance = holdout_importance(&artifact, &x_test, config)?;

    if let Some(path) = &config.baseline_path {
        write_baseline(path, &x_train)?;
    }

    Ok(TrainingReport {
        roc_auc: metrics.roc_auc,
        pr_auc: metrics.pr_auc,
        f1: metrics.f1,
        expected_cost: metrics.expected_cost,
        scale_pos_weight,
        backend: artifact.backend,
        feature_importance,
        holdout_stats,
        train_rows: split.train.len(),
        test_rows: split.test.len(),
        model_path: config.model_path.clone(),
    })
}

fn labels(failures: &[bool], indices: &[usize]) -> Vec<bool> {
    indices.iter().map(|&i| failures[i]).collect()
}

fn holdout_importance(
    artifact: &ModelArtifact,
    x_test: &FeatureMatrix,
    config: &TrainingConfig,
) -> Result<Vec<FeatureContribution>, TrainingError> {
    let n = x_test.n_rows().min(config.importance_sample_size);
    if n == 0 {
        return Ok(Vec::new());
    }
    let sample = x_test.rows(&(0..n).collect::<Vec<_>>())?;

    let explainer = Explainer::for_model(
        artifact.classifier(),
        &ExplainerConfig {
            permutation_seed: config.random_state,
            ..ExplainerConfig::default()
        },
    );
    let summary = explainer.summary(artifact.classifier(), &sample)?;
    let ranked = summary.contributions.ranked();
    if let Some(top) = ranked.first() {
        info!(
            "Top feature by {} importance: {} ({:.4})",
            summary.method.as_str(),
            top.feature,
            top.contribution
        );
    }
    Ok(ranked)
}

fn write_baseline(path: &Path, x_train: &FeatureMatrix) -> Result<(), TrainingError> {
    let baseline = build_monitoring_baseline(&x_train.to_frame());
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(&baseline)?)?;
    info!(
        "Wrote monitoring baseline for {} columns to {}",
        baseline.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use feature_engine::FEATURE_COLUMNS;
    use monitoring::MonitoringBaseline;
    use sensor_data::DataError;
    use std::fmt::Write as _;
    use tempfile::TempDir;

    const HEADER: &str = "UDI,Type,Air temperature [K],Process temperature [K],Rotational speed [rpm],Torque [Nm],Tool wear [min],Machine failure";

    fn write_dataset(dir: &TempDir) -> PathBuf {
        let mut csv = format!("{HEADER}\n");
        for i in 0..200usize {
            let failure = i % 8 == 0;
            let torque = if failure { 65 + i % 5 } else { 30 + i % 20 };
            let air = 298.0 + (i % 10) as f64 * 0.1;
            let torque_cell = if i == 3 { String::new() } else { torque.to_string() };
            writeln!(
                csv,
                "{},M,{:.1},{:.1},{},{},{},{}",
                i + 1,
                air,
                air + 10.0,
                1500 - torque * 5,
                torque_cell,
                (i * 7) % 250,
                u8::from(failure)
            )
            .unwrap();
        }
        let path = dir.path().join("sensors.csv");
        fs::write(&path, csv).unwrap();
        path
    }

    fn config(dir: &TempDir, backends: &[&str]) -> TrainingConfig {
        let mut config = TrainingConfig::defaults().unwrap();
        config.data_path = write_dataset(dir);
        config.model_path = dir.path().join("models").join("model.bin");
        config.backends = backends.iter().map(|s| s.to_string()).collect();
        config.gradient_boosting.n_estimators = 20;
        config.gradient_boosting.max_depth = 3;
        config
    }

    #[test]
    fn test_logistic_run_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, &["logistic_regression"]);
        let report = train(&config).unwrap();

        assert_eq!(report.backend, ModelBackend::LogisticRegression);
        assert_eq!(report.train_rows + report.test_rows, 200);
        assert_eq!(report.test_rows, 40);
        // 175 negatives and 25 positives, 80% of each in training
        assert_eq!(report.scale_pos_weight, 140.0 / 20.0);
        assert!(report.roc_auc > 0.7);
        assert!((0.0..=1.0).contains(&report.pr_auc));
        assert_eq!(report.feature_importance.len(), FEATURE_COLUMNS.len());
        assert!(report.holdout_stats.mean_probability > 0.0);

        let artifact = ArtifactStore::new(&config.model_path).load().unwrap();
        assert_eq!(artifact.backend, ModelBackend::LogisticRegression);
        assert_eq!(artifact.features, FEATURE_COLUMNS.map(String::from).to_vec());
        assert_eq!(artifact.metrics.unwrap().roc_auc, report.roc_auc);
    }

    #[cfg(feature = "gradient-boosting")]
    #[test]
    fn test_gradient_boosting_run() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, &["gradient_boosting", "logistic_regression"]);
        let report = train(&config).unwrap();

        assert_eq!(report.backend, ModelBackend::GradientBoosting);
        assert!(report.expected_cost >= 0.0);
        let importance: Vec<f64> = report
            .feature_importance
            .iter()
            .map(|c| c.contribution.abs())
            .collect();
        assert!(importance.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_feature_order_is_stable_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, &["logistic_regression"]);
        train(&config).unwrap();
        let first = ArtifactStore::new(&config.model_path).load().unwrap();
        train(&config).unwrap();
        let second = ArtifactStore::new(&config.model_path).load().unwrap();
        assert_eq!(first.features, second.features);
        assert_ne!(first.model_id, second.model_id);
    }

    #[test]
    fn test_baseline_written() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&dir, &["logistic_regression"]);
        let baseline_path = dir.path().join("reports").join("baseline.json");
        config.baseline_path = Some(baseline_path.clone());
        train(&config).unwrap();

        let baseline: MonitoringBaseline =
            serde_json::from_str(&fs::read_to_string(baseline_path).unwrap()).unwrap();
        assert_eq!(baseline.len(), FEATURE_COLUMNS.len());
        assert!(baseline.get("torque").unwrap().mean > 0.0);
    }

    #[test]
    fn test_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&dir, &["logistic_regression"]);
        config.data_path = dir.path().join("absent.csv");
        assert!(matches!(
            train(&config),
            Err(TrainingError::Data(DataError::NotFound(_)))
        ));
    }

    #[test]
    fn test_blank_tool_wear_column() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&dir, &["logistic_regression"]);
        let path = dir.path().join("no_wear.csv");
        let rows: String = (0..50)
            .map(|i| format!("{},L,300,310,1500,{},,{}\n", i, 30 + i, u8::from(i % 5 == 0)))
            .collect();
        fs::write(&path, format!("{HEADER}\n{rows}")).unwrap();
        config.data_path = path;
        assert!(matches!(
            train(&config),
            Err(TrainingError::Data(DataError::EmptyColumns(names))) if names == vec!["tool_wear".to_string()]
        ));
    }

    #[test]
    fn test_no_usable_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = config(&dir, &["random_forest"]);
        assert!(matches!(
            train(&config),
            Err(TrainingError::NoBackendAvailable(_))
        ));
        assert!(!config.model_path.exists());
    }

    #[test]
    fn test_single_class_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(&dir, &["logistic_regression"]);
        let path = dir.path().join("healthy.csv");
        let rows: String = (0..20)
            .map(|i| format!("{},L,300,310,1500,{},{},0\n", i, 40 + i, i * 3))
            .collect();
        fs::write(&path, format!("{HEADER}\n{rows}")).unwrap();
        config.data_path = path;
        assert!(matches!(train(&config), Err(TrainingError::SingleClass)));
    }
}
