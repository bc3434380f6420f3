mod shapes;

mod best_cutting_planes;
mod clip;
mod convex_hull;
mod decompose;
mod invalid_input;
mod merge;
mod normalize;
mod repair;
