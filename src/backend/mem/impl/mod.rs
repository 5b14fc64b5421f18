mod action;
mod algorithm;
mod pipeline;
mod task;
