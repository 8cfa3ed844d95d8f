//! # Chunk Manager
//!
//! Orchestrates a full world generation pass as a tick-driven state machine:
//!
//! ```text
//! Idle -> GridComputed -> Generating -> Collecting -> Finished
//! ```
//!
//! 1. `compute_grid` derives the chunk grid from the configured world size
//! 2. `start_generation` partitions the grid round-robin across worker threads;
//!    each worker owns its coordinates and its own heightfield and appends
//!    non-empty `ChunkData` to one shared buffer
//! 3. `tick`, called once per frame by the host, polls the workers without
//!    blocking and drains their per-chunk outcomes
//! 4. When every worker has exited, the same tick buckets the records into
//!    regions, builds each region's world index for cross-chunk culling, meshes
//!    every chunk and hands the meshes to a new `Region`
//!
//! Records arrive in whatever order workers finish them. Bucketing by region
//! and sorting each bucket by chunk coordinate makes the final meshes
//! independent of that order.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use cgmath::Point3;
use log::{debug, error, info, warn};
use web_time::Instant;

use crate::{
    core::MtResource,
    error::WorldGenError,
    meshing::{ChunkMesh, Region, RegionKey, RegionTemplate},
    task_management::{resolve_worker_count, WorkerPool},
    voxels::{
        chunk::{Chunk, ChunkData},
        tasks::chunk_generation_task::{ChunkGenerationTask, ChunkOutcome, ChunkStatus},
        world_index::WorldIndex,
    },
    world::{
        config::WorldConfig,
        grid::{partition_round_robin, WorldGrid},
    },
};

/// Progress of a generation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationState {
    /// Nothing computed yet.
    Idle,
    /// The chunk grid is known; no worker is running.
    GridComputed,
    /// Workers have been started.
    Generating,
    /// Waiting for every worker to exit.
    Collecting,
    /// Regions are built; further ticks do nothing.
    Finished,
}

/// Tally of per-chunk outcomes reported by the workers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    /// Chunks that produced voxels.
    pub generated: usize,
    /// Chunks entirely above the terrain, dropped before buffering.
    pub empty: usize,
    /// Chunks whose generation failed, with the reason.
    pub failures: Vec<(Point3<i32>, String)>,
    /// Buried chunks left out of meshing.
    pub skipped_buried: usize,
    /// Workers that died outside per-chunk generation.
    pub panicked_workers: usize,
}

impl GenerationReport {
    fn record(&mut self, outcome: ChunkOutcome) {
        match outcome.status {
            ChunkStatus::Generated { .. } => self.generated += 1,
            ChunkStatus::Empty => self.empty += 1,
            ChunkStatus::Failed(reason) => self.failures.push((outcome.coord, reason)),
        }
    }

    /// Number of chunks whose generation failed.
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// Number of chunk coordinates that reported back.
    pub fn processed(&self) -> usize {
        self.generated + self.empty + self.failed()
    }
}

/// Drives world generation from configuration to finished regions.
pub struct ChunkManager {
    config: WorldConfig,
    region_template: Option<Arc<dyn RegionTemplate>>,
    state: GenerationState,
    grid: Option<WorldGrid>,
    /// Shared buffer workers append to; one lock per append.
    results: MtResource<Vec<ChunkData>>,
    pool: Option<WorkerPool<ChunkOutcome>>,
    report: GenerationReport,
    regions: Vec<Region>,
    started_at: Option<Instant>,
}

impl ChunkManager {
    /// Creates an idle manager.
    ///
    /// # Arguments
    /// * `config` - Generation options, normalised on the way in
    /// * `region_template` - Factory for region surfaces; generation refuses to
    ///   start without one
    pub fn new(config: WorldConfig, region_template: Option<Arc<dyn RegionTemplate>>) -> Self {
        ChunkManager {
            config: config.normalized(),
            region_template,
            state: GenerationState::Idle,
            grid: None,
            results: MtResource::new(Vec::new()),
            pool: None,
            report: GenerationReport::default(),
            regions: Vec::new(),
            started_at: None,
        }
    }

    /// The normalised configuration in use.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Current generation state.
    pub fn state(&self) -> GenerationState {
        self.state
    }

    /// The chunk grid, once computed.
    pub fn grid(&self) -> Option<&WorldGrid> {
        self.grid.as_ref()
    }

    /// Outcomes collected so far in the current pass.
    pub fn report(&self) -> &GenerationReport {
        &self.report
    }

    /// Regions built by the finished pass, ordered by region key.
    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Number of records currently waiting in the shared buffer.
    pub fn buffered_chunks(&self) -> usize {
        self.results.get().len()
    }

    /// Worker threads used by the current pass.
    pub fn worker_count(&self) -> usize {
        self.pool.as_ref().map_or(0, WorkerPool::worker_count)
    }

    fn expect_state(&self, expected: GenerationState) -> Result<(), WorldGenError> {
        if self.state != expected {
            return Err(WorldGenError::InvalidState {
                expected,
                found: self.state,
            });
        }
        Ok(())
    }

    /// Derives the chunk grid. `Idle -> GridComputed`.
    ///
    /// A chunk count above the configured threshold only logs a warning.
    pub fn compute_grid(&mut self) -> Result<&WorldGrid, WorldGenError> {
        self.expect_state(GenerationState::Idle)?;

        let grid = WorldGrid::new(self.config.world_dimensions, self.config.chunk_size);
        let total = grid.total_chunks();
        info!(
            "World grid: {:?} chunks of size {} ({} total)",
            grid.number_of_chunks(),
            grid.chunk_size(),
            total
        );
        if total > self.config.chunk_count_warning_threshold {
            warn!(
                "Generating {} chunks exceeds the recommended {}; expect high memory use",
                total, self.config.chunk_count_warning_threshold
            );
        }

        self.state = GenerationState::GridComputed;
        Ok(self.grid.insert(grid))
    }

    /// Starts the worker threads. `GridComputed -> Generating`.
    ///
    /// # Errors
    /// * [`WorldGenError::MissingRegionTemplate`] if there is nowhere to put the
    ///   resulting meshes; no thread is started
    /// * [`WorldGenError::InvalidState`] if the grid has not been computed
    pub fn start_generation(&mut self) -> Result<(), WorldGenError> {
        if self.region_template.is_none() {
            error!("{}", WorldGenError::MissingRegionTemplate);
            return Err(WorldGenError::MissingRegionTemplate);
        }
        self.expect_state(GenerationState::GridComputed)?;
        let Some(grid) = self.grid else {
            return Err(WorldGenError::InvalidState {
                expected: GenerationState::GridComputed,
                found: self.state,
            });
        };

        let coordinates = grid.coordinates();
        let worker_count =
            resolve_worker_count(self.config.thread_count).min(coordinates.len().max(1));
        let heightfield = self.config.heightfield_settings();

        let tasks: Vec<ChunkGenerationTask> = partition_round_robin(coordinates, worker_count)
            .into_iter()
            .enumerate()
            .map(|(worker_id, coordinates)| {
                debug!("Worker {} assigned {} chunks", worker_id, coordinates.len());
                ChunkGenerationTask::new(
                    worker_id,
                    coordinates,
                    grid.chunk_size(),
                    heightfield,
                    self.config.palette.clone(),
                    self.results.clone(),
                )
            })
            .collect();

        info!(
            "Generating {} chunks on {} workers (requested {})",
            grid.total_chunks(),
            tasks.len(),
            self.config.thread_count
        );

        self.report = GenerationReport::default();
        self.regions.clear();
        self.started_at = Some(Instant::now());
        self.pool = Some(WorkerPool::spawn(tasks));
        self.state = GenerationState::Generating;
        Ok(())
    }

    /// Advances the state machine by one step. Never blocks on workers.
    ///
    /// # Returns
    /// The state after the tick.
    pub fn tick(&mut self) -> GenerationState {
        if self.state == GenerationState::Generating {
            self.state = GenerationState::Collecting;
        }
        if self.state != GenerationState::Collecting {
            return self.state;
        }

        self.drain_outcomes();

        let finished = self.pool.as_ref().map_or(true, WorkerPool::all_finished);
        if finished {
            self.finish();
        }
        self.state
    }

    /// Runs a whole pass on the calling thread, ticking until it finishes.
    pub fn generate_blocking(&mut self) -> Result<&[Region], WorldGenError> {
        if self.state == GenerationState::Idle {
            self.compute_grid()?;
        }
        if self.state == GenerationState::GridComputed {
            self.start_generation()?;
        }
        while self.tick() != GenerationState::Finished {
            thread::sleep(Duration::from_millis(1));
        }
        Ok(&self.regions)
    }

    fn drain_outcomes(&mut self) {
        if let Some(pool) = &self.pool {
            for outcome in pool.drain_outcomes() {
                self.report.record(outcome);
            }
        }
    }

    /// Single-threaded build phase. `Collecting -> Finished`.
    fn finish(&mut self) {
        if let Some(mut pool) = self.pool.take() {
            self.report.panicked_workers = pool.join();
            for outcome in pool.drain_outcomes() {
                self.report.record(outcome);
            }
        }

        let records = std::mem::take(&mut *self.results.get_mut());
        let generated_in = self.started_at.map(|start| start.elapsed());

        let Some(template) = self.region_template.clone() else {
            error!("{}", WorldGenError::MissingRegionTemplate);
            self.state = GenerationState::Finished;
            return;
        };
        let grid_chunk_size = self
            .grid
            .map_or(self.config.chunk_size as i32, |grid| grid.chunk_size());

        let build_start = Instant::now();
        let (regions, skipped_buried) = assemble_regions(
            records,
            grid_chunk_size,
            self.config.region_size as i32,
            self.config.skip_buried_chunks,
            template.as_ref(),
        );
        self.regions = regions;
        self.report.skipped_buried = skipped_buried;
        self.state = GenerationState::Finished;

        let triangles: usize = self.regions.iter().map(|r| r.mesh().triangle_count()).sum();
        info!(
            "World generation finished: {} generated, {} empty, {} failed",
            self.report.generated,
            self.report.empty,
            self.report.failed()
        );
        info!(
            "{} regions, {} triangles (voxels {:?}, meshing {:?})",
            self.regions.len(),
            triangles,
            generated_in,
            build_start.elapsed()
        );
        for (coord, reason) in &self.report.failures {
            warn!("Chunk {:?} missing from the world: {}", coord, reason);
        }
    }
}

impl Drop for ChunkManager {
    fn drop(&mut self) {
        // Workers must be joined before the shared buffer goes away.
        if let Some(pool) = self.pool.take() {
            drop(pool);
        }
        self.results.get_mut().clear();
    }
}

/// Groups chunk records into regions and builds each region's mesh.
///
/// Records are bucketed by `(coord.x / region_size, coord.z / region_size)`.
/// Inside a bucket, a world index over every record drives cross-chunk culling,
/// so faces between two chunks of the same region are suppressed. Buckets and
/// their records are processed in coordinate order, which makes the result
/// independent of the order of `records`.
///
/// # Returns
/// The regions ordered by key, and the number of buried chunks that were not
/// meshed.
pub fn assemble_regions(
    records: Vec<ChunkData>,
    chunk_size: i32,
    region_size: i32,
    skip_buried: bool,
    template: &dyn RegionTemplate,
) -> (Vec<Region>, usize) {
    let mut buckets: BTreeMap<RegionKey, Vec<ChunkData>> = BTreeMap::new();
    for record in records {
        let key = RegionKey::for_chunk(record.coord.x, record.coord.z, region_size);
        buckets.entry(key).or_default().push(record);
    }

    let mut regions = Vec::with_capacity(buckets.len());
    let mut skipped_buried = 0;

    for (key, mut bucket) in buckets {
        bucket.sort_by_key(|record| (record.coord.x, record.coord.y, record.coord.z));
        let index = WorldIndex::from_chunk_data(&bucket);

        let mut meshes: Vec<ChunkMesh> = Vec::with_capacity(bucket.len());
        for record in &bucket {
            if skip_buried && record.is_buried(chunk_size) {
                skipped_buried += 1;
                continue;
            }
            let mut chunk = Chunk::from_chunk_data(chunk_size, record);
            chunk.generate_mesh_data(Some(&index));
            meshes.push(chunk.into_chunk_mesh());
        }

        let mut region = Region::new(key, template.instantiate(key));
        region.build_from_mesh_data(&meshes);
        debug!(
            "Region {:?}: {} chunks, {} indexed voxels",
            key,
            bucket.len(),
            index.len()
        );
        regions.push(region);
    }

    (regions, skipped_buried)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meshing::MeshBufferTemplate;
    use crate::voxels::block::{Block, Color};
    use crate::voxels::heightfield::{Heightfield, HeightfieldSettings};

    fn small_config() -> WorldConfig {
        WorldConfig {
            world_dimensions: [64, 32, 48],
            chunk_size: 16,
            region_size: 2,
            seed: 5,
            thread_count: 3,
            max_height: Some(32.0),
            noise_frequency: 0.03,
            ..WorldConfig::default()
        }
    }

    #[test]
    fn missing_template_aborts_before_any_worker_starts() {
        let mut manager = ChunkManager::new(small_config(), None);
        manager.compute_grid().expect("grid");

        let error = manager.start_generation().unwrap_err();

        assert!(matches!(error, WorldGenError::MissingRegionTemplate));
        assert_eq!(manager.state(), GenerationState::GridComputed);
        assert_eq!(manager.worker_count(), 0);
        assert!(matches!(manager.generate_blocking(), Err(WorldGenError::MissingRegionTemplate)));
    }

    #[test]
    fn operations_out_of_order_are_rejected() {
        let template = Arc::new(MeshBufferTemplate::new());
        let mut manager = ChunkManager::new(small_config(), Some(template));

        assert!(matches!(
            manager.start_generation(),
            Err(WorldGenError::InvalidState {
                expected: GenerationState::GridComputed,
                found: GenerationState::Idle,
            })
        ));
        manager.compute_grid().expect("grid");
        assert!(manager.compute_grid().is_err());
        assert_eq!(manager.tick(), GenerationState::GridComputed);
    }

    #[test]
    fn state_machine_runs_to_finished() {
        let template = Arc::new(MeshBufferTemplate::new());
        let mut manager = ChunkManager::new(small_config(), Some(template.clone()));

        assert_eq!(manager.state(), GenerationState::Idle);
        let total = manager.compute_grid().expect("grid").total_chunks();
        assert_eq!(total, 4 * 2 * 3);
        manager.start_generation().expect("start");
        assert_eq!(manager.state(), GenerationState::Generating);
        assert!(manager.worker_count() >= 1);

        let mut ticks = 0;
        while manager.tick() != GenerationState::Finished {
            assert_eq!(manager.state(), GenerationState::Collecting);
            thread::sleep(Duration::from_millis(1));
            ticks += 1;
            assert!(ticks < 60_000, "generation never finished");
        }

        let report = manager.report().clone();
        assert_eq!(report.processed(), total);
        assert_eq!(report.failed(), 0);
        assert_eq!(manager.buffered_chunks(), 0);
        assert!(!manager.regions().is_empty());
        assert_eq!(template.surfaces().len(), manager.regions().len());

        // Finished is terminal.
        let regions_before = manager.regions().len();
        assert_eq!(manager.tick(), GenerationState::Finished);
        assert_eq!(manager.regions().len(), regions_before);
    }

    #[test]
    fn regions_bucket_chunks_by_xz() {
        let template = MeshBufferTemplate::new();
        let record = |x: i32, y: i32, z: i32| ChunkData {
            coord: Point3::new(x, y, z),
            origin: Point3::new(x * 4, y * 4, z * 4),
            blocks: vec![Block::pack(0, 0, 0, Color::DEFAULT)],
            min_height: Some(1),
        };
        let records = vec![
            record(0, 0, 0),
            record(1, 3, 1),
            record(2, 0, 0),
            record(3, 1, 3),
            record(0, 2, 2),
        ];

        let (regions, skipped) = assemble_regions(records, 4, 2, false, &template);

        let keys: Vec<RegionKey> = regions.iter().map(Region::key).collect();
        assert_eq!(
            keys,
            vec![
                RegionKey { x: 0, z: 0 },
                RegionKey { x: 0, z: 1 },
                RegionKey { x: 1, z: 0 },
                RegionKey { x: 1, z: 1 },
            ]
        );
        assert_eq!(regions[0].chunk_count(), 2);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn buried_chunks_are_skipped_when_requested() {
        let template = MeshBufferTemplate::new();
        let heightfield = Heightfield::new(HeightfieldSettings {
            seed: 0,
            frequency: 0.0,
            max_height: 200.0,
        });
        let height = heightfield.column_height(0, 0);
        assert!(height > 16);

        let mut chunk = Chunk::new(16, Point3::new(0, 0, 0));
        let min_height = chunk.generate_data(&heightfield, &[]);
        let buried = chunk.to_chunk_data(Point3::new(0, 0, 0), min_height);
        assert!(buried.is_buried(16));

        let (regions, skipped) = assemble_regions(vec![buried.clone()], 16, 4, true, &template);
        assert_eq!(skipped, 1);
        assert!(regions[0].mesh().is_empty());

        let (regions, skipped) = assemble_regions(vec![buried], 16, 4, false, &template);
        assert_eq!(skipped, 0);
        assert_eq!(regions[0].mesh().face_count(), 6 * 16 * 16);
    }

    #[test]
    fn dropping_mid_generation_joins_workers() {
        let config = WorldConfig {
            world_dimensions: [256, 64, 256],
            ..small_config()
        };
        let mut manager = ChunkManager::new(config, Some(Arc::new(MeshBufferTemplate::new())));
        manager.compute_grid().expect("grid");
        manager.start_generation().expect("start");
        let buffer = manager.results.clone();

        drop(manager);

        // Every worker handle was joined, so only this clone remains.
        assert_eq!(buffer.handle_count(), 1);
    }
}
