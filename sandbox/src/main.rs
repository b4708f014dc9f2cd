mod point;

use anyhow::Result;
use chunkalloc::{
    log::{info, logging_thread_join, logging_thread_start, warn, LogLevel, Logger, LoggerBuilder},
    memory::{ChunkAllocator, ChunkVec, Rebind},
};

use point::Point;

fn loggers(min_level: LogLevel) -> Vec<Logger> {
    vec![
        LoggerBuilder::new(chunkalloc::log::logger_impl::CORE_LOGGER_NAME)
            .tag("Allocator")
            .min_level(min_level)
            .build(),
        LoggerBuilder::new(chunkalloc::log::logger_impl::APP_LOGGER_NAME)
            .tag("Sandbox")
            .min_level(min_level)
            .build(),
    ]
}

fn run() -> Result<()> {
    let mut points = ChunkVec::<Point>::new();
    points.push(Point::new(1, 2))?;
    points.push(Point::new(32, 32))?;
    points.push(Point::new(42, -1232))?;
    points.push(Point::new(1012, -2))?;
    info!("Vector holds {:?}", points);

    let mut alloc = ChunkAllocator::<Point>::new();
    let arr = alloc.allocate(3)?;
    unsafe {
        alloc.construct(arr, Point::new(1, 2));
        alloc.construct(arr.add(1), Point::new(132, 8));
        alloc.construct(arr.add(2), Point::new(0, 0));
    }
    for i in 0..3 {
        info!("arr[{}] = {}", i, unsafe { arr.add(i).as_ref() });
    }

    let alloc_two = alloc.clone();
    let mut alloc_three = ChunkAllocator::<Point>::new();
    alloc_three.clone_from(&alloc_two);
    info!(
        "Shared chain reference counts: {:?}",
        alloc_three.ref_counts().collect::<Vec<_>>()
    );

    let extra = alloc_three.allocate(2)?;
    unsafe {
        alloc_three.construct(extra, Point::new(1, 2));
        alloc_three.construct(extra.add(1), Point::new(132, 8));
    }
    drop(alloc);
    drop(alloc_two);
    info!("arr[0] is still readable: {}", unsafe { arr.as_ref() });

    let mut other = alloc_three.rebind::<i32>();
    let ints = other.allocate(10)?;
    other.deallocate(ints, 10);

    if let Err(e) = other.allocate(129) {
        warn!("{}", e);
    }

    unsafe {
        for i in 0..3 {
            alloc_three.destroy(arr.add(i));
        }
        for i in 0..2 {
            alloc_three.destroy(extra.add(i));
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let min_level = match std::env::args().nth(1) {
        Some(level) => level.parse()?,
        None => LogLevel::Debug,
    };

    logging_thread_start(Some(loggers(min_level)))?;
    let result = run();
    logging_thread_join()?;
    result
}
