//! # Chunk Generation Task
//!
//! This module defines the `ChunkGenerationTask`, the workload of one
//! generation worker: a list of chunk-grid coordinates plus a private
//! heightfield to generate them with.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;

use cgmath::Point3;
use log::{debug, warn};

use crate::{
    core::MtResource,
    task_management::task::Task,
    voxels::{
        block::Color,
        chunk::{Chunk, ChunkData},
        heightfield::{Heightfield, HeightfieldSettings},
    },
};

/// What happened to one chunk coordinate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChunkStatus {
    /// Voxels were generated and the record was added to the result buffer.
    Generated {
        /// Number of unique blocks stored.
        blocks: usize,
    },
    /// The chunk lies entirely above the terrain; nothing was stored.
    Empty,
    /// Generation panicked; the chunk is missing from the results.
    Failed(String),
}

/// Per-coordinate report sent back to the chunk manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkOutcome {
    /// Chunk-grid coordinate the outcome is for.
    pub coord: Point3<i32>,
    /// What happened to the chunk.
    pub status: ChunkStatus,
}

/// A task that generates voxel data for a disjoint set of chunks.
///
/// This task is responsible for:
/// 1. Building its own heightfield, so no noise state is shared between threads
/// 2. Generating each chunk and dropping the ones that came out empty
/// 3. Appending every non-empty `ChunkData` to the shared buffer, one lock per append
/// 4. Reporting an outcome for every coordinate it was given
pub struct ChunkGenerationTask {
    worker_id: usize,
    coordinates: Vec<Point3<i32>>,
    chunk_size: i32,
    heightfield: HeightfieldSettings,
    palette: Vec<Color>,
    results: MtResource<Vec<ChunkData>>,
}

impl ChunkGenerationTask {
    /// Creates a new chunk generation task.
    ///
    /// # Arguments
    /// * `worker_id` - Index of the worker, used for logging
    /// * `coordinates` - Chunk-grid coordinates this worker owns
    /// * `chunk_size` - Edge length of every chunk
    /// * `heightfield` - Settings the worker builds its own heightfield from
    /// * `palette` - Colours cycled by height
    /// * `results` - Shared buffer that receives generated chunk data
    pub fn new(
        worker_id: usize,
        coordinates: Vec<Point3<i32>>,
        chunk_size: i32,
        heightfield: HeightfieldSettings,
        palette: Vec<Color>,
        results: MtResource<Vec<ChunkData>>,
    ) -> Self {
        ChunkGenerationTask {
            worker_id,
            coordinates,
            chunk_size,
            heightfield,
            palette,
            results,
        }
    }

    /// Coordinates this task will generate, in processing order.
    pub fn coordinates(&self) -> &[Point3<i32>] {
        &self.coordinates
    }

    fn generate(&self, heightfield: &Heightfield, coord: Point3<i32>) -> ChunkData {
        let origin = Point3::new(
            coord.x * self.chunk_size,
            coord.y * self.chunk_size,
            coord.z * self.chunk_size,
        );
        let mut chunk = Chunk::new(self.chunk_size, origin);
        let min_height = chunk.generate_data(heightfield, &self.palette);
        chunk.to_chunk_data(coord, min_height)
    }
}

impl Task for ChunkGenerationTask {
    type Outcome = ChunkOutcome;

    fn process(self, cancel: &AtomicBool, outcomes: &Sender<ChunkOutcome>) {
        let heightfield = Heightfield::new(self.heightfield);
        let mut stored = 0;

        for &coord in &self.coordinates {
            if cancel.load(Ordering::Relaxed) {
                debug!("Worker {} cancelled after {} chunks", self.worker_id, stored);
                return;
            }

            let generated =
                panic::catch_unwind(AssertUnwindSafe(|| self.generate(&heightfield, coord)));
            let status = match generated {
                Ok(data) if data.is_empty() => ChunkStatus::Empty,
                Ok(data) => {
                    let blocks = data.blocks.len();
                    self.results.get_mut().push(data);
                    stored += 1;
                    ChunkStatus::Generated { blocks }
                }
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    warn!("Worker {}: chunk {:?} failed: {}", self.worker_id, coord, reason);
                    ChunkStatus::Failed(reason)
                }
            };

            let _ = outcomes.send(ChunkOutcome { coord, status });
        }

        debug!(
            "Worker {} finished: {} of {} chunks stored",
            self.worker_id,
            stored,
            self.coordinates.len()
        );
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    fn settings() -> HeightfieldSettings {
        HeightfieldSettings {
            seed: 11,
            frequency: 0.02,
            max_height: 32.0,
        }
    }

    #[test]
    fn reports_every_coordinate_and_stores_non_empty_chunks() {
        let results = MtResource::new(Vec::new());
        let coordinates = vec![Point3::new(0, 0, 0), Point3::new(1, 0, 0), Point3::new(0, 40, 0)];
        let task = ChunkGenerationTask::new(
            0,
            coordinates.clone(),
            16,
            settings(),
            vec![Color::DEFAULT],
            results.clone(),
        );
        let (sender, receiver) = channel();

        task.process(&AtomicBool::new(false), &sender);
        drop(sender);

        let outcomes: Vec<ChunkOutcome> = receiver.iter().collect();
        assert_eq!(outcomes.iter().map(|o| o.coord).collect::<Vec<_>>(), coordinates);
        assert_eq!(outcomes[2].status, ChunkStatus::Empty);

        let stored = results.get();
        let generated = outcomes
            .iter()
            .filter(|o| matches!(o.status, ChunkStatus::Generated { .. }))
            .count();
        assert_eq!(stored.len(), generated);
        assert!(stored.iter().all(|data| !data.is_empty()));
        for data in stored.iter() {
            let expected = Point3::new(data.coord.x * 16, data.coord.y * 16, data.coord.z * 16);
            assert_eq!(data.origin, expected);
        }
    }

    #[test]
    fn cancelled_task_does_no_work() {
        let results = MtResource::new(Vec::new());
        let coordinates = vec![Point3::new(0, 0, 0)];
        let task =
            ChunkGenerationTask::new(0, coordinates, 16, settings(), Vec::new(), results.clone());
        let (sender, receiver) = channel();

        task.process(&AtomicBool::new(true), &sender);
        drop(sender);

        assert!(receiver.iter().next().is_none());
        assert!(results.get().is_empty());
    }

    #[test]
    fn panic_messages_are_extracted() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("bad chunk");
        assert_eq!(panic_message(payload.as_ref()), "bad chunk");
        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn std::any::Any + Send> = Box::new(5u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
