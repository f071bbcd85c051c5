mod common;
mod cost_measures;
mod ray_driven_builds;
mod rtsah_ordering;
mod serialization;
mod traversal_agreement;
mod visibility;
