mod batch_runner;
mod subscription;
