pub mod ffmpeg_camera_source;
